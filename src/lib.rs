//! # Resource Diff
//!
//! Structural diffs between the current and desired arguments of a
//! declaratively managed resource.
//!
//! Argument types describe their fields with tags (`"size,immutable"`). Two
//! values of the same type are marshalled into property trees and compared
//! field by field; every changed leaf is reported under its canonical property
//! path as an add, update or delete, escalated to a replace when it lies under
//! an immutable field. Users may name paths whose changes are ignored, either
//! while diffing or by pinning them in the desired state beforehand.
//!
//! ## Modules
//!
//! - [`value`] - Property trees: the dynamically typed form of resource arguments
//! - [`fieldpath`] - Property paths: parsing, canonical rendering and resetting
//! - [`schema`] - Field descriptors, per-type schema extraction and schema documents
//! - [`typed`] - Marshalling typed arguments to and from property trees
//! - [`diff`] - The diff engine and its results
//! - [`ignore`] - The ignore-changes preprocessor

pub mod diff;
pub mod fieldpath;
pub mod ignore;
pub mod schema;
pub mod typed;
pub mod value;

pub use diff::{diff, diff_args, DiffError, DiffKind, DiffResult, PropertyDiff};
pub use fieldpath::{PathElement, PropertyPath};
pub use ignore::{apply_ignore_changes, apply_ignore_changes_args, IgnoreChangesError};
pub use schema::{schema_of, Args, FieldDescriptor, ObjectSchema, Shape, StructField};
pub use typed::ArgsValue;
pub use value::Value;
