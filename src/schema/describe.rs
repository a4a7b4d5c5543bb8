//! Field descriptor extraction from declarative field tags.

use super::elements::{FieldDescriptor, StructField};
use thiserror::Error;

/// SchemaError reports a defect in an argument type's description. These are
/// programming errors in the type definition, never diff outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field {field}: unknown option {option:?}")]
    UnknownOption { field: String, option: String },

    #[error("{type_name}: more than one field is exposed as {name:?}")]
    DuplicateName { type_name: String, name: String },

    #[error("no type found matching: {name}")]
    UnknownType { name: String },

    #[error("type {name} refers to itself")]
    RecursiveType { name: String },

    #[error("failed to parse schema: {message}")]
    Parse { message: String },
}

impl SchemaError {
    /// Creates an unknown option error.
    pub fn unknown_option(field: impl Into<String>, option: impl Into<String>) -> Self {
        SchemaError::UnknownOption {
            field: field.into(),
            option: option.into(),
        }
    }

    /// Creates a duplicate name error.
    pub fn duplicate_name(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        SchemaError::DuplicateName {
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(name: impl Into<String>) -> Self {
        SchemaError::UnknownType { name: name.into() }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        SchemaError::Parse {
            message: message.into(),
        }
    }
}

/// Describes one field from its tag.
///
/// Returns `Ok(None)` for an untagged field, which is invisible to diffing.
/// The first tag segment is the exposed name (empty means the camel-cased
/// identifier); every further segment must be one of `required`, `optional`,
/// `immutable`, `deprecated` or `secret`. Fields holding an `Option` default
/// to not required.
pub fn describe_field(field: &StructField) -> Result<Option<FieldDescriptor>, SchemaError> {
    let Some(tag) = field.tag.as_deref() else {
        return Ok(None);
    };

    let mut segments = tag.split(',');
    let mut desc = FieldDescriptor::new(field.ident.as_str()).with_shape(field.shape.clone());
    if let Some(name) = segments.next().filter(|n| !n.is_empty()) {
        desc = desc.named(name);
    }
    if field.optional {
        desc = desc.optional();
    }

    for option in segments {
        match option {
            "required" => desc.required = true,
            "optional" => desc.required = false,
            "immutable" => desc.immutable = true,
            "deprecated" => desc.deprecated = true,
            "secret" => desc.secret = true,
            other => return Err(SchemaError::unknown_option(&field.ident, other)),
        }
    }
    Ok(Some(desc))
}

/// Converts a snake_case identifier to the camelCase property name.
pub fn camel_case(ident: &str) -> String {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    let mut out = String::with_capacity(ident.len());
    for (i, part) in ident.split('_').filter(|p| !p.is_empty()).enumerate() {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Shape;

    fn describe(ident: &str, tag: Option<&str>, optional: bool) -> Result<Option<FieldDescriptor>, SchemaError> {
        let mut field = StructField::new(ident).with_shape(Shape::Scalar);
        field.tag = tag.map(str::to_string);
        field.optional = optional;
        describe_field(&field)
    }

    #[test]
    fn test_untagged_field_is_absent() {
        assert!(describe("size", None, false).unwrap().is_none());
    }

    #[test]
    fn test_default_name_is_camel_cased() {
        let desc = describe("instance_type", Some(""), false).unwrap().unwrap();
        assert_eq!(desc.name, "instanceType");
        assert_eq!(desc.field, "instance_type");
        assert!(desc.required);
        assert!(!desc.immutable && !desc.deprecated && !desc.secret);

        let desc = describe("size", Some(",immutable"), false).unwrap().unwrap();
        assert_eq!(desc.name, "size");
        assert!(desc.immutable);
    }

    #[test]
    fn test_options() {
        let desc = describe("password", Some("pw,secret,deprecated,optional"), false)
            .unwrap()
            .unwrap();
        assert_eq!(desc.name, "pw");
        assert!(desc.secret);
        assert!(desc.deprecated);
        assert!(!desc.required);
    }

    #[test]
    fn test_option_fields_default_to_optional() {
        let desc = describe("label", Some("label"), true).unwrap().unwrap();
        assert!(!desc.required);

        let desc = describe("label", Some("label,required"), true).unwrap().unwrap();
        assert!(desc.required);
    }

    #[test]
    fn test_unknown_option_is_an_error() {
        let err = describe("size", Some("size,imutable"), false).unwrap_err();
        assert_eq!(err, SchemaError::unknown_option("size", "imutable"));
        assert_eq!(err.to_string(), r#"field size: unknown option "imutable""#);

        assert!(describe("size", Some("size,"), false).is_err());
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("size"), "size");
        assert_eq!(camel_case("instance_type"), "instanceType");
        assert_eq!(camel_case("r#type"), "type");
        assert_eq!(camel_case("_private_key"), "privateKey");
        assert_eq!(camel_case("URL"), "uRL");
    }
}
