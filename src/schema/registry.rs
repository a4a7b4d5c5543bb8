//! Per-type schema extraction and caching for Rust argument types.

use super::describe::SchemaError;
use super::elements::{ObjectSchema, SchemaRef, Shape, StructField};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Args is implemented by resource argument types.
///
/// Implementors list their fields with tags:
///
/// ```
/// use resource_diff::schema::{Args, Shape, StructField};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Bucket {
///     region: String,
///     versioning: Option<bool>,
/// }
///
/// impl Args for Bucket {
///     fn fields() -> Vec<StructField> {
///         vec![
///             StructField::new("region").tagged("region,immutable").with_shape(Shape::Scalar),
///             StructField::new("versioning").tagged("").optional().with_shape(Shape::Scalar),
///         ]
///     }
/// }
/// ```
///
/// or override [`Args::schema`] to build descriptors directly.
pub trait Args: Serialize + 'static {
    /// Returns the raw field list, tagged or not.
    fn fields() -> Vec<StructField> {
        Vec::new()
    }

    /// Builds the object schema. Called at most once per type by
    /// [`schema_of`] unless it fails.
    fn schema() -> Result<ObjectSchema, SchemaError> {
        ObjectSchema::from_fields(type_name::<Self>(), Self::fields())
    }
}

static SCHEMAS: Lazy<RwLock<HashMap<TypeId, Arc<ObjectSchema>>>> = Lazy::new(Default::default);

/// Returns the schema of `T`, building it on first use.
///
/// Entries are never replaced once inserted, so concurrent callers diffing
/// different types never observe a half-built schema. A schema that fails to
/// build is not cached.
pub fn schema_of<T: Args>() -> Result<Arc<ObjectSchema>, SchemaError> {
    let id = TypeId::of::<T>();
    if let Some(schema) = SCHEMAS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return Ok(schema.clone());
    }

    let built = Arc::new(T::schema()?);
    let mut cache = SCHEMAS.write().unwrap_or_else(PoisonError::into_inner);
    let schema = cache.entry(id).or_insert(built).clone();
    tracing::debug!(
        type_name = schema.type_name(),
        fields = schema.fields().len(),
        "described argument type"
    );
    Ok(schema)
}

impl Shape {
    /// Returns the shape of a nested argument type.
    pub fn of<T: Args>() -> Self {
        Shape::Struct(SchemaRef::Lazy(schema_of::<T>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;

    #[derive(Serialize)]
    struct Tagged {
        size: i64,
        note: String,
    }

    impl Args for Tagged {
        fn fields() -> Vec<StructField> {
            vec![
                StructField::new("size").tagged("size,immutable"),
                StructField::new("note"),
            ]
        }
    }

    #[derive(Serialize)]
    struct Built {
        zone: String,
    }

    impl Args for Built {
        fn schema() -> Result<ObjectSchema, SchemaError> {
            ObjectSchema::from_descriptors("Built", vec![FieldDescriptor::new("zone").immutable()])
        }
    }

    #[derive(Serialize)]
    struct Broken {
        size: i64,
    }

    impl Args for Broken {
        fn fields() -> Vec<StructField> {
            vec![StructField::new("size").tagged("size,frozen")]
        }
    }

    #[derive(Serialize)]
    struct Node {
        children: Vec<Node>,
    }

    impl Args for Node {
        fn fields() -> Vec<StructField> {
            vec![StructField::new("children").tagged("").with_shape(Shape::array(Shape::of::<Node>()))]
        }
    }

    #[test]
    fn test_schema_is_cached() {
        let first = schema_of::<Tagged>().unwrap();
        let second = schema_of::<Tagged>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.fields().len(), 1);
        assert!(first.type_name().ends_with("Tagged"));
    }

    #[test]
    fn test_schema_override() {
        let schema = schema_of::<Built>().unwrap();
        assert_eq!(schema.type_name(), "Built");
        assert!(schema.field("zone").unwrap().immutable);
    }

    #[test]
    fn test_broken_tags_fail_every_time() {
        assert_eq!(schema_of::<Broken>().unwrap_err(), SchemaError::unknown_option("size", "frozen"));
        assert!(schema_of::<Broken>().is_err());
    }

    #[test]
    fn test_self_referential_type() {
        let schema = schema_of::<Node>().unwrap();
        let children = schema.field("children").unwrap();
        match children.shape.element() {
            Shape::Struct(inner) => {
                assert!(Arc::ptr_eq(&inner.resolve().unwrap(), &schema));
            }
            other => panic!("expected struct shape, got {}", other),
        }
    }

    #[test]
    fn test_concurrent_first_use() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| schema_of::<Built>().unwrap()))
            .collect();
        let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(schemas.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
