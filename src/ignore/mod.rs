//! Ignore module - Pins ignored paths of a desired state to their current
//! values.
//!
//! This runs on property trees before diffing, or on its own, so that the
//! paths a user asked to ignore keep the value the resource already has.

use crate::fieldpath::PropertyPath;
use crate::schema::Args;
use crate::typed::{marshal, unmarshal_onto, MapperError};
use crate::value::Value;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// IgnoreChangesError reports ignore-changes paths that could not be applied.
#[derive(Debug, Error)]
pub enum IgnoreChangesError {
    #[error(
        "cannot ignore changes to the following properties because one or more elements of the path are missing: {}",
        quote_all(.paths)
    )]
    InvalidPaths { paths: Vec<String> },

    #[error(transparent)]
    Mapper(#[from] MapperError),
}

fn quote_all(paths: &[String]) -> String {
    paths.iter().map(|p| format!("{:?}", p)).collect::<Vec<_>>().join(", ")
}

/// Returns a copy of `new` in which every path in `ignore_changes` holds its
/// value from `current`.
///
/// A path present in `current` is copied into the result and a path absent
/// from `current` is removed from it. Paths that cannot be followed, or that do
/// not parse, are collected and reported together; no tree is returned then.
pub fn apply_ignore_changes<S: AsRef<str>>(
    current: &Value,
    new: &Value,
    ignore_changes: &[S],
) -> Result<Value, IgnoreChangesError> {
    let mut result = new.clone();
    let mut invalid = Vec::new();

    for raw in ignore_changes {
        let raw = raw.as_ref();
        let applied = match PropertyPath::parse(raw) {
            Ok(path) => path.reset(current, &mut result),
            Err(err) => {
                tracing::debug!(path = raw, error = %err, "unparseable ignore-changes path");
                false
            }
        };
        if !applied {
            tracing::warn!(path = raw, "cannot apply ignore-changes path");
            invalid.push(raw.to_string());
        }
    }

    if invalid.is_empty() {
        Ok(result)
    } else {
        Err(IgnoreChangesError::InvalidPaths { paths: invalid })
    }
}

/// Applies [`apply_ignore_changes`] to typed arguments.
///
/// Returns `new` with the ignored paths pinned. Fields of `new` that take no
/// part in diffing are carried over unchanged.
pub fn apply_ignore_changes_args<T, S>(current: &T, new: &T, ignore_changes: &[S]) -> Result<T, IgnoreChangesError>
where
    T: Args + DeserializeOwned,
    S: AsRef<str>,
{
    let pinned = apply_ignore_changes(&marshal(current)?, &marshal(new)?, ignore_changes)?;
    Ok(unmarshal_onto(&pinned, new)?)
}
