//! Mapping between typed argument structs and property trees.
//!
//! Marshalled trees are keyed by exposed property names and contain only
//! described fields, so that paths in them match the paths users write.

use crate::schema::{schema_of, Args, SchemaError, SchemaRef, Shape};
use crate::value::{Map, Value};
use serde::de::DeserializeOwned;
use std::any::type_name;
use thiserror::Error;

/// MapperError reports a failure to convert between a typed struct and a tree.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("failed to encode {type_name}: {source}")]
    Encode {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {type_name}: {source}")]
    Decode {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{type_name} must be represented as an object, found {found}")]
    NotAnObject { type_name: &'static str, found: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Marshals `args` into a property tree keyed by exposed names.
pub fn marshal<T: Args>(args: &T) -> Result<Value, MapperError> {
    let raw = serde_json::to_value(args).map_err(|source| MapperError::Encode {
        type_name: type_name::<T>(),
        source,
    })?;
    let raw = Value::from(raw);
    if !raw.is_map() {
        return Err(MapperError::NotAnObject {
            type_name: type_name::<T>(),
            found: raw.kind().to_string(),
        });
    }
    expose(raw, &Shape::Struct(SchemaRef::Resolved(schema_of::<T>()?)))
}

/// Unmarshals `tree` into `target`.
///
/// Described fields of `target` are replaced by their values in `tree` (or
/// cleared when absent from it); undescribed fields keep their current value.
pub fn unmarshal_into<T: Args + DeserializeOwned>(tree: &Value, target: &mut T) -> Result<(), MapperError> {
    *target = unmarshal_onto(tree, target)?;
    Ok(())
}

/// Builds a new `T` from `tree`, taking undescribed fields from `base`.
pub fn unmarshal_onto<T: Args + DeserializeOwned>(tree: &Value, base: &T) -> Result<T, MapperError> {
    if !tree.is_map() {
        return Err(MapperError::NotAnObject {
            type_name: type_name::<T>(),
            found: tree.kind().to_string(),
        });
    }
    let raw = serde_json::to_value(base).map_err(|source| MapperError::Encode {
        type_name: type_name::<T>(),
        source,
    })?;
    let shape = Shape::Struct(SchemaRef::Resolved(schema_of::<T>()?));
    let merged = conceal(tree, &shape, Value::from(raw))?;
    serde_json::from_value(serde_json::Value::from(&merged)).map_err(|source| MapperError::Decode {
        type_name: type_name::<T>(),
        source,
    })
}

/// Renames serialized identifiers to exposed names and drops undescribed
/// fields, all the way down.
fn expose(value: Value, shape: &Shape) -> Result<Value, MapperError> {
    Ok(match (value, shape) {
        (Value::Map(mut map), Shape::Struct(schema)) => {
            let schema = schema.resolve()?;
            let mut out = Map::new();
            for field in schema.fields() {
                if let Some(v) = map.delete(&field.field) {
                    out.set(field.name.clone(), expose(v, &field.shape)?);
                }
            }
            Value::Map(out)
        }
        (Value::Map(map), Shape::Map(element)) => Value::Map(
            map.fields
                .into_iter()
                .map(|(k, v)| Ok((k, expose(v, element)?)))
                .collect::<Result<Map, MapperError>>()?,
        ),
        (Value::List(items), Shape::Array(element)) => Value::List(
            items
                .into_iter()
                .map(|v| expose(v, element))
                .collect::<Result<Vec<_>, MapperError>>()?,
        ),
        (other, _) => other,
    })
}

/// Reverses [`expose`]: writes the described fields of `tree` back under
/// their identifiers on top of `base`.
fn conceal(tree: &Value, shape: &Shape, base: Value) -> Result<Value, MapperError> {
    Ok(match (tree, shape) {
        (Value::Map(map), Shape::Struct(schema)) => {
            let schema = schema.resolve()?;
            let mut out = match base {
                Value::Map(m) => m,
                _ => Map::new(),
            };
            for field in schema.fields() {
                let previous = out.delete(&field.field).unwrap_or_default();
                if let Some(v) = map.get(&field.name) {
                    out.set(field.field.clone(), conceal(v, &field.shape, previous)?);
                }
            }
            Value::Map(out)
        }
        (Value::Map(map), Shape::Map(element)) => {
            let mut previous = match base {
                Value::Map(m) => m,
                _ => Map::new(),
            };
            let mut out = Map::new();
            for (k, v) in map.iter() {
                let prev = previous.delete(k).unwrap_or_default();
                out.set(k.clone(), conceal(v, element, prev)?);
            }
            Value::Map(out)
        }
        (Value::List(items), Shape::Array(element)) => {
            let mut previous = match base {
                Value::List(l) => l.into_iter(),
                _ => Vec::new().into_iter(),
            };
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(conceal(item, element, previous.next().unwrap_or_default())?);
            }
            Value::List(out)
        }
        (other, _) => other.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StructField;
    use crate::value::from_json;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Rule {
        from_port: i64,
        #[serde(default)]
        note: String,
    }

    impl Args for Rule {
        fn fields() -> Vec<StructField> {
            vec![
                StructField::new("from_port").tagged("").with_shape(Shape::Scalar),
                StructField::new("note"),
            ]
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Firewall {
        instance_type: String,
        description: Option<String>,
        rules: Vec<Rule>,
        etag: String,
    }

    impl Args for Firewall {
        fn fields() -> Vec<StructField> {
            vec![
                StructField::new("instance_type").tagged(",immutable").with_shape(Shape::Scalar),
                StructField::new("description").tagged("desc").optional().with_shape(Shape::Scalar),
                StructField::new("rules").tagged("rules").with_shape(Shape::array(Shape::of::<Rule>())),
                StructField::new("etag"),
            ]
        }
    }

    fn firewall() -> Firewall {
        Firewall {
            instance_type: "t3.micro".into(),
            description: None,
            rules: vec![Rule {
                from_port: 22,
                note: "ssh".into(),
            }],
            etag: "abc".into(),
        }
    }

    #[test]
    fn test_marshal_uses_exposed_names() {
        let tree = marshal(&firewall()).unwrap();
        assert_eq!(
            tree,
            from_json(r#"{"instanceType":"t3.micro","desc":null,"rules":[{"fromPort":22}]}"#).unwrap()
        );
    }

    #[test]
    fn test_unmarshal_keeps_undescribed_fields() {
        let mut target = firewall();
        let tree = from_json(r#"{"instanceType":"m5.large","desc":"edge","rules":[{"fromPort":443},{"fromPort":80}]}"#)
            .unwrap();
        unmarshal_into(&tree, &mut target).unwrap();

        assert_eq!(target.instance_type, "m5.large");
        assert_eq!(target.description.as_deref(), Some("edge"));
        assert_eq!(target.etag, "abc");
        assert_eq!(target.rules[0], Rule { from_port: 443, note: "ssh".into() });
        assert_eq!(target.rules[1], Rule { from_port: 80, note: String::new() });
    }

    #[test]
    fn test_unmarshal_missing_optional_is_none() {
        let mut target = firewall();
        target.description = Some("old".into());
        let tree = from_json(r#"{"instanceType":"t3.micro","rules":[]}"#).unwrap();
        unmarshal_into(&tree, &mut target).unwrap();
        assert_eq!(target.description, None);
        assert!(target.rules.is_empty());
    }

    #[test]
    fn test_unmarshal_missing_required_fails() {
        let mut target = firewall();
        let tree = from_json(r#"{"rules":[]}"#).unwrap();
        assert!(matches!(unmarshal_into(&tree, &mut target), Err(MapperError::Decode { .. })));
    }

    #[test]
    fn test_non_object_tree_rejected() {
        let mut target = firewall();
        assert!(matches!(
            unmarshal_into(&Value::Int(1), &mut target),
            Err(MapperError::NotAnObject { .. })
        ));
    }
}
