//! The recursive diff engine.

use super::result::{DiffKind, DiffResult, PropertyDiff};
use crate::fieldpath::PropertyPath;
use crate::schema::{Args, SchemaError, Shape};
use crate::typed::{ArgsValue, MapperError};
use crate::value::{normalize, Map, Value, ValueKind};
use thiserror::Error;

/// DiffError reports a diff that could not be computed. No partial result is
/// ever returned alongside one.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("cannot diff {current} against {new}: arguments must be of the same type")]
    TypeMismatch { current: String, new: String },

    #[error("value at {path:?} does not conform to its schema: expected {expected}, found {actual}")]
    UnsupportedKind {
        path: String,
        expected: String,
        actual: ValueKind,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Mapper(#[from] MapperError),
}

impl DiffError {
    /// Creates a new type mismatch error.
    pub fn type_mismatch(current: impl Into<String>, new: impl Into<String>) -> Self {
        DiffError::TypeMismatch {
            current: current.into(),
            new: new.into(),
        }
    }

    /// Creates a new unsupported kind error.
    pub fn unsupported_kind(path: &PropertyPath, expected: &Shape, actual: ValueKind) -> Self {
        DiffError::UnsupportedKind {
            path: path.to_string(),
            expected: expected.to_string(),
            actual,
        }
    }
}

/// Diffs two argument values of the same type.
///
/// Changes at paths equal to one of `ignore_changes` are not reported; an
/// ignored container suppresses everything below it, except inside a value
/// that is added or removed as a whole. Paths that fail to parse are dropped
/// with a warning.
pub fn diff<S: AsRef<str>>(
    current: &ArgsValue,
    new: &ArgsValue,
    ignore_changes: &[S],
) -> Result<DiffResult, DiffError> {
    if !current.same_type(new) {
        return Err(DiffError::type_mismatch(current.type_name(), new.type_name()));
    }
    let result = diff_trees(current.value(), new.value(), &current.shape(), ignore_changes)?;
    tracing::debug!(
        type_name = current.type_name(),
        changes = result.len(),
        requires_replace = result.requires_replace(),
        "computed resource diff"
    );
    Ok(result)
}

/// Marshals two typed arguments and diffs them.
pub fn diff_args<T: Args, S: AsRef<str>>(
    current: &T,
    new: &T,
    ignore_changes: &[S],
) -> Result<DiffResult, DiffError> {
    diff(&ArgsValue::from_args(current)?, &ArgsValue::from_args(new)?, ignore_changes)
}

/// Diffs two property trees against `shape`. With [`Shape::Any`] every key is
/// compared and nothing is immutable.
pub fn diff_trees<S: AsRef<str>>(
    current: &Value,
    new: &Value,
    shape: &Shape,
    ignore_changes: &[S],
) -> Result<DiffResult, DiffError> {
    let ignore = parse_ignore_paths(ignore_changes);
    let mut differ = Differ {
        ignore: &ignore,
        result: DiffResult::new(),
    };
    differ.diff_values(&PropertyPath::new(), current, new, shape, false)?;
    Ok(differ.result)
}

/// Parses ignore-changes paths, dropping those that do not parse.
pub fn parse_ignore_paths<S: AsRef<str>>(paths: &[S]) -> Vec<PropertyPath> {
    paths
        .iter()
        .filter_map(|raw| {
            let raw = raw.as_ref();
            match PropertyPath::parse(raw) {
                Ok(path) => Some(path),
                Err(err) => {
                    tracing::warn!(path = raw, error = %err, "ignoring unparseable ignore-changes path");
                    None
                }
            }
        })
        .collect()
}

struct Differ<'a> {
    ignore: &'a [PropertyPath],
    result: DiffResult,
}

impl Differ<'_> {
    fn is_ignored(&self, path: &PropertyPath) -> bool {
        let ignored = self.ignore.iter().any(|p| p == path);
        if ignored {
            tracing::trace!(path = %path, "change ignored");
        }
        ignored
    }

    fn record(&mut self, path: &PropertyPath, kind: DiffKind, immutable: bool) {
        let kind = kind.escalate(immutable);
        tracing::trace!(path = %path, %kind, "recorded property diff");
        self.result.insert(path.to_string(), PropertyDiff::input(kind));
    }

    fn diff_values(
        &mut self,
        path: &PropertyPath,
        current: &Value,
        new: &Value,
        shape: &Shape,
        immutable: bool,
    ) -> Result<(), DiffError> {
        if self.is_ignored(path) {
            return Ok(());
        }
        let current = normalize(current);
        let new = normalize(new);
        check_shape(path, &current, shape)?;
        check_shape(path, &new, shape)?;

        match (current.as_ref(), new.as_ref()) {
            (Value::Null, Value::Null) => Ok(()),
            (Value::List(c), Value::List(n)) => self.diff_lists(path, c, n, shape.element(), immutable),
            (Value::Map(c), Value::Map(n)) => self.diff_objects(path, c, n, shape, immutable),
            (c, n) if c.is_scalar() && c.kind() == n.kind() => {
                if !same_scalar(c, n) {
                    self.record(path, DiffKind::Update, immutable);
                }
                Ok(())
            }
            (c, n) => self.replace_value(path, c, n, shape, immutable),
        }
    }

    fn diff_lists(
        &mut self,
        path: &PropertyPath,
        current: &[Value],
        new: &[Value],
        element: &Shape,
        immutable: bool,
    ) -> Result<(), DiffError> {
        let common = current.len().min(new.len());
        for (i, (c, n)) in current.iter().zip(new).enumerate() {
            self.diff_values(&path.element(i), c, n, element, immutable)?;
        }
        for (i, v) in new.iter().enumerate().skip(common) {
            self.add_value(&path.element(i), v, element, immutable)?;
        }
        for (i, v) in current.iter().enumerate().skip(common) {
            self.remove_value(&path.element(i), v, element, immutable)?;
        }
        Ok(())
    }

    fn diff_objects(
        &mut self,
        path: &PropertyPath,
        current: &Map,
        new: &Map,
        shape: &Shape,
        immutable: bool,
    ) -> Result<(), DiffError> {
        if let Shape::Struct(schema) = shape {
            let schema = schema.resolve()?;
            for field in schema.fields() {
                let child = path.field(field.name.as_str());
                let immutable = immutable || field.immutable;
                match (current.get(&field.name), new.get(&field.name)) {
                    (Some(c), Some(n)) => self.diff_values(&child, c, n, &field.shape, immutable)?,
                    (Some(c), None) => self.remove_value(&child, c, &field.shape, immutable)?,
                    (None, Some(n)) => self.add_value(&child, n, &field.shape, immutable)?,
                    (None, None) => {}
                }
            }
            return Ok(());
        }

        let element = shape.element();
        for (key, c) in current.iter() {
            let child = path.field(key.as_str());
            match new.get(key) {
                Some(n) => self.diff_values(&child, c, n, element, immutable)?,
                None => self.remove_value(&child, c, element, immutable)?,
            }
        }
        for (key, n) in new.iter().filter(|(k, _)| !current.has(k)) {
            self.add_value(&path.field(key.as_str()), n, element, immutable)?;
        }
        Ok(())
    }

    fn replace_value(
        &mut self,
        path: &PropertyPath,
        current: &Value,
        new: &Value,
        shape: &Shape,
        immutable: bool,
    ) -> Result<(), DiffError> {
        self.remove_value(path, current, shape, immutable)?;
        self.add_value(path, new, shape, immutable)
    }

    fn add_value(&mut self, path: &PropertyPath, value: &Value, shape: &Shape, immutable: bool) -> Result<(), DiffError> {
        self.walk(path, value, shape, immutable, DiffKind::Add)
    }

    fn remove_value(
        &mut self,
        path: &PropertyPath,
        value: &Value,
        shape: &Shape,
        immutable: bool,
    ) -> Result<(), DiffError> {
        self.walk(path, value, shape, immutable, DiffKind::Delete)
    }

    /// Records `kind` at every scalar leaf of `value`.
    fn walk(
        &mut self,
        path: &PropertyPath,
        value: &Value,
        shape: &Shape,
        immutable: bool,
        kind: DiffKind,
    ) -> Result<(), DiffError> {
        let value = normalize(value);
        check_shape(path, &value, shape)?;

        match value.as_ref() {
            Value::Null => {}
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.walk(&path.element(i), item, shape.element(), immutable, kind)?;
                }
            }
            Value::Map(map) => {
                if let Shape::Struct(schema) = shape {
                    let schema = schema.resolve()?;
                    for field in schema.fields() {
                        if let Some(v) = map.get(&field.name) {
                            let child = path.field(field.name.as_str());
                            self.walk(&child, v, &field.shape, immutable || field.immutable, kind)?;
                        }
                    }
                } else {
                    for (key, v) in map.iter() {
                        self.walk(&path.field(key.as_str()), v, shape.element(), immutable, kind)?;
                    }
                }
            }
            _ => self.record(path, kind, immutable),
        }
        Ok(())
    }
}

/// Compares two scalars of one kind. Unlike `PartialEq`, NaN equals NaN.
fn same_scalar(current: &Value, new: &Value) -> bool {
    match (current, new) {
        (Value::Float(c), Value::Float(n)) if c.is_nan() && n.is_nan() => true,
        (c, n) => c == n,
    }
}

/// Checks that `value` has a kind `shape` admits. Null conforms to every
/// shape.
fn check_shape(path: &PropertyPath, value: &Value, shape: &Shape) -> Result<(), DiffError> {
    let conforms = value.is_null()
        || match shape {
            Shape::Any => true,
            Shape::Scalar => value.is_scalar(),
            Shape::Array(_) => value.is_list(),
            Shape::Map(_) | Shape::Struct(_) => value.is_map(),
        };
    if conforms {
        Ok(())
    } else {
        Err(DiffError::unsupported_kind(path, shape, value.kind()))
    }
}
