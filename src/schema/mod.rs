//! Schema module - Describes which fields of an argument type take part in
//! diffing, and how.
//!
//! Descriptors come from declarative field tags (or a builder), are extracted
//! once per Rust type and cached, or are loaded from a YAML schema document.

mod describe;
mod document;
mod elements;
mod registry;

pub use describe::*;
pub use document::*;
pub use elements::*;
pub use registry::*;
