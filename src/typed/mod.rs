//! Typed module - Property trees paired with the argument type they describe.
//!
//! This module converts typed argument structs to and from property trees.

mod args_value;
mod mapper;

pub use args_value::*;
pub use mapper::*;
