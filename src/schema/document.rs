//! Schema documents: argument types described in YAML.
//!
//! ```yaml
//! types:
//! - name: Box
//!   fields:
//!   - field: size
//!     tag: size,immutable
//!     type: {kind: scalar}
//!   - field: rules
//!     tag: rules
//!     type: {kind: array, element: {kind: struct, name: Rule}}
//! - name: Rule
//!   fields:
//!   - field: port
//!     tag: port
//! ```
//!
//! A field without `type` holds any value. Named types are resolved when the
//! document is compiled and may not refer to themselves.

use super::describe::SchemaError;
use super::elements::{ObjectSchema, SchemaRef, Shape, StructField};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// SchemaDocument is a list of named argument types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeDef>,
}

/// TypeDef describes one named argument type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,
}

/// FieldDef is the document form of a [`StructField`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldDef {
    pub field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default)]
    pub optional: bool,

    #[serde(default, rename = "type")]
    pub field_type: TypeSpec,
}

/// TypeSpec is the document form of a [`Shape`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeSpec {
    Scalar,
    #[default]
    Any,
    Array { element: Box<TypeSpec> },
    Map { element: Box<TypeSpec> },
    Struct { name: String },
}

impl SchemaDocument {
    /// Parses a schema document from YAML (or JSON).
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(yaml).map_err(|e| SchemaError::parse(e.to_string()))
    }

    /// Returns the names of the types in this document.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    /// Compiles the named type, and every type it refers to, into an object
    /// schema. Every field tag is validated along the way.
    pub fn compile(&self, name: &str) -> Result<Arc<ObjectSchema>, SchemaError> {
        Compiler {
            document: self,
            in_progress: Vec::new(),
            done: HashMap::new(),
        }
        .compile_type(name)
    }
}

struct Compiler<'a> {
    document: &'a SchemaDocument,
    in_progress: Vec<String>,
    done: HashMap<String, Arc<ObjectSchema>>,
}

impl Compiler<'_> {
    fn compile_type(&mut self, name: &str) -> Result<Arc<ObjectSchema>, SchemaError> {
        if let Some(schema) = self.done.get(name) {
            return Ok(schema.clone());
        }
        if self.in_progress.iter().any(|n| n == name) {
            return Err(SchemaError::RecursiveType {
                name: name.to_string(),
            });
        }
        let def = self
            .document
            .types
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SchemaError::unknown_type(name))?;

        self.in_progress.push(name.to_string());
        let mut fields = Vec::with_capacity(def.fields.len());
        for f in &def.fields {
            fields.push(StructField {
                ident: f.field.clone(),
                tag: f.tag.clone(),
                optional: f.optional,
                shape: self.compile_spec(&f.field_type)?,
            });
        }
        self.in_progress.pop();

        let schema = Arc::new(ObjectSchema::from_fields(name, fields)?);
        self.done.insert(name.to_string(), schema.clone());
        Ok(schema)
    }

    fn compile_spec(&mut self, spec: &TypeSpec) -> Result<Shape, SchemaError> {
        Ok(match spec {
            TypeSpec::Scalar => Shape::Scalar,
            TypeSpec::Any => Shape::Any,
            TypeSpec::Array { element } => Shape::array(self.compile_spec(element)?),
            TypeSpec::Map { element } => Shape::map(self.compile_spec(element)?),
            TypeSpec::Struct { name } => Shape::Struct(SchemaRef::Resolved(self.compile_type(name)?)),
        })
    }
}
