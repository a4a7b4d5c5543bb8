//! Value module - In-memory representation of marshalled resource arguments.
//!
//! Trees built from JSON, YAML or typed structs all share this representation.

mod value;

pub use value::*;
