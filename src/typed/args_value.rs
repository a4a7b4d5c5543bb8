//! ArgsValue implementation.

use super::mapper::{marshal, MapperError};
use crate::schema::{schema_of, Args, ObjectSchema, SchemaRef, Shape};
use crate::value::Value;
use std::sync::Arc;

/// ArgsValue is a marshalled property tree paired with the schema of the
/// argument type it was produced from.
#[derive(Debug, Clone)]
pub struct ArgsValue {
    value: Value,
    schema: Arc<ObjectSchema>,
}

impl ArgsValue {
    /// Creates a new ArgsValue. The tree is expected to be keyed by exposed
    /// property names.
    pub fn new(value: Value, schema: Arc<ObjectSchema>) -> Self {
        ArgsValue { value, schema }
    }

    /// Marshals `args` and pairs the tree with the schema of `T`.
    pub fn from_args<T: Args>(args: &T) -> Result<Self, MapperError> {
        Ok(ArgsValue {
            value: marshal(args)?,
            schema: schema_of::<T>()?,
        })
    }

    /// Returns a reference to the underlying value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns a mutable reference to the underlying value.
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Consumes the ArgsValue and returns the underlying value.
    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn schema(&self) -> &Arc<ObjectSchema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    /// Returns the shape of the root of the tree.
    pub fn shape(&self) -> Shape {
        Shape::Struct(SchemaRef::Resolved(self.schema.clone()))
    }

    /// Reports whether both values were produced from the same argument type.
    ///
    /// Distinct schemas count as the same type only if they share a type name
    /// and describe the same fields.
    pub fn same_type(&self, other: &ArgsValue) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) || self.schema.same_layout(&other.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, StructField};
    use crate::value::from_json;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Disk {
        size_gb: i64,
    }

    impl Args for Disk {
        fn fields() -> Vec<StructField> {
            vec![StructField::new("size_gb").tagged("")]
        }
    }

    #[test]
    fn test_from_args() {
        let v = ArgsValue::from_args(&Disk { size_gb: 20 }).unwrap();
        assert_eq!(v.value(), &from_json(r#"{"sizeGb":20}"#).unwrap());
        assert!(v.type_name().ends_with("Disk"));
        assert_eq!(v.shape().to_string(), format!("struct {}", v.type_name()));
    }

    #[test]
    fn test_same_type() {
        let a = ArgsValue::from_args(&Disk { size_gb: 1 }).unwrap();
        let b = ArgsValue::from_args(&Disk { size_gb: 2 }).unwrap();
        assert!(a.same_type(&b));

        let other = ObjectSchema::from_descriptors("Volume", vec![FieldDescriptor::new("size")]).unwrap();
        let c = ArgsValue::new(Value::Null, Arc::new(other));
        assert!(!a.same_type(&c));
    }

    #[test]
    fn test_same_name_different_fields() {
        let first = ObjectSchema::from_descriptors("Box", vec![FieldDescriptor::new("size").immutable()]).unwrap();
        let same = ObjectSchema::from_descriptors("Box", vec![FieldDescriptor::new("size").immutable()]).unwrap();
        let other = ObjectSchema::from_descriptors("Box", vec![FieldDescriptor::new("size")]).unwrap();

        let a = ArgsValue::new(Value::Null, Arc::new(first));
        assert!(a.same_type(&ArgsValue::new(Value::Null, Arc::new(same))));
        assert!(!a.same_type(&ArgsValue::new(Value::Null, Arc::new(other))));
    }
}
