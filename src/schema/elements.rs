//! Core schema elements: shapes, fields and object schemas.

use super::describe::{camel_case, describe_field, SchemaError};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Resolves the schema of a struct-typed value.
pub type SchemaFn = fn() -> Result<Arc<ObjectSchema>, SchemaError>;

/// SchemaRef points at the schema of a nested struct.
///
/// Rust argument types refer to each other lazily through the per-type cache,
/// which lets a type mention itself; schema documents resolve eagerly.
#[derive(Debug, Clone)]
pub enum SchemaRef {
    Resolved(Arc<ObjectSchema>),
    Lazy(SchemaFn),
}

impl SchemaRef {
    /// Returns the referenced schema.
    pub fn resolve(&self) -> Result<Arc<ObjectSchema>, SchemaError> {
        match self {
            SchemaRef::Resolved(schema) => Ok(schema.clone()),
            SchemaRef::Lazy(f) => f(),
        }
    }
}

static ANY: Shape = Shape::Any;

/// Shape is the declared structure of a value.
#[derive(Debug, Clone, Default)]
pub enum Shape {
    /// A bool, number or string.
    Scalar,
    /// Anything; maps are compared key by key without descriptors.
    #[default]
    Any,
    /// An array whose elements all have the given shape.
    Array(Box<Shape>),
    /// A string-keyed map whose values all have the given shape.
    Map(Box<Shape>),
    /// A struct with described fields.
    Struct(SchemaRef),
}

impl Shape {
    pub fn array(element: Shape) -> Self {
        Shape::Array(Box::new(element))
    }

    pub fn map(element: Shape) -> Self {
        Shape::Map(Box::new(element))
    }

    pub fn object(schema: ObjectSchema) -> Self {
        Shape::Struct(SchemaRef::Resolved(Arc::new(schema)))
    }

    /// Returns the shape of elements of an array or map. Anything nested in
    /// an `Any` is itself `Any`.
    pub fn element(&self) -> &Shape {
        match self {
            Shape::Array(e) | Shape::Map(e) => e,
            _ => &ANY,
        }
    }

    /// Reports whether both shapes admit the same values. Nested structs are
    /// compared by type name.
    pub fn same_layout(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Scalar, Shape::Scalar) | (Shape::Any, Shape::Any) => true,
            (Shape::Array(a), Shape::Array(b)) | (Shape::Map(a), Shape::Map(b)) => a.same_layout(b),
            (Shape::Struct(a), Shape::Struct(b)) => match (a.resolve(), b.resolve()) {
                (Ok(a), Ok(b)) => a.type_name() == b.type_name(),
                _ => false,
            },
            _ => false,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => write!(f, "scalar"),
            Shape::Any => write!(f, "any"),
            Shape::Array(e) => write!(f, "array<{}>", e),
            Shape::Map(e) => write!(f, "map<{}>", e),
            Shape::Struct(SchemaRef::Resolved(s)) => write!(f, "struct {}", s.type_name()),
            Shape::Struct(SchemaRef::Lazy(_)) => write!(f, "struct"),
        }
    }
}

/// StructField is the raw description of one field of an argument type: its
/// serialized identifier and its declarative tag.
#[derive(Debug, Clone)]
pub struct StructField {
    /// The key the field serializes under.
    pub ident: String,
    /// Tag of the form `name[,required|optional][,immutable][,deprecated][,secret]`.
    /// Untagged fields take no part in diffing.
    pub tag: Option<String>,
    /// True if the field holds an `Option`.
    pub optional: bool,
    pub shape: Shape,
}

impl StructField {
    /// Creates an untagged field holding any shape.
    pub fn new(ident: impl Into<String>) -> Self {
        StructField {
            ident: ident.into(),
            tag: None,
            optional: false,
            shape: Shape::Any,
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }
}

/// FieldDescriptor holds the diff semantics of one described field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// The key the field serializes under.
    pub field: String,
    /// The exposed property name, used in paths.
    pub name: String,
    pub required: bool,
    /// Changing an immutable field, or anything below it, requires replacement.
    pub immutable: bool,
    pub deprecated: bool,
    pub secret: bool,
    pub shape: Shape,
}

impl FieldDescriptor {
    /// Creates a required descriptor named after the camel-cased identifier.
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        FieldDescriptor {
            name: camel_case(&field),
            field,
            required: true,
            immutable: false,
            deprecated: false,
            secret: false,
            shape: Shape::Any,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }
}

/// ObjectSchema is the ordered set of described fields of one argument type.
///
/// Field lookups are indexed on first use, so the schema should be considered
/// immutable once built.
#[derive(Debug)]
pub struct ObjectSchema {
    type_name: String,
    fields: Vec<FieldDescriptor>,
    by_name: OnceCell<HashMap<String, usize>>,
}

impl Clone for ObjectSchema {
    fn clone(&self) -> Self {
        ObjectSchema {
            type_name: self.type_name.clone(),
            fields: self.fields.clone(),
            by_name: OnceCell::new(),
        }
    }
}

impl ObjectSchema {
    /// Builds a schema from descriptors. Exposed names must be unique.
    pub fn from_descriptors(
        type_name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let type_name = type_name.into();
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::duplicate_name(&type_name, &field.name));
            }
        }
        Ok(ObjectSchema {
            type_name,
            fields,
            by_name: OnceCell::new(),
        })
    }

    /// Builds a schema by describing each field. Untagged fields are left out.
    pub fn from_fields(
        type_name: impl Into<String>,
        fields: Vec<StructField>,
    ) -> Result<Self, SchemaError> {
        let mut described = Vec::with_capacity(fields.len());
        for field in &fields {
            if let Some(desc) = describe_field(field)? {
                described.push(desc);
            }
        }
        Self::from_descriptors(type_name, described)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the described fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the descriptor with the given exposed name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        let index = self.by_name.get_or_init(|| {
            self.fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.name.clone(), i))
                .collect()
        });
        index.get(name).map(|&i| &self.fields[i])
    }

    /// Returns the descriptor for the given serialized identifier.
    pub fn field_by_ident(&self, ident: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field == ident)
    }

    /// Reports whether both schemas carry the same type name and describe the
    /// same fields, in order, with the same flags and shapes.
    pub fn same_layout(&self, other: &ObjectSchema) -> bool {
        self.type_name == other.type_name
            && self.fields.len() == other.fields.len()
            && self.fields.iter().zip(&other.fields).all(|(a, b)| {
                a.field == b.field
                    && a.name == b.name
                    && a.required == b.required
                    && a.immutable == b.immutable
                    && a.deprecated == b.deprecated
                    && a.secret == b.secret
                    && a.shape.same_layout(&b.shape)
            })
    }
}
