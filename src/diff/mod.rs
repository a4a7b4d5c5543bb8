//! Diff module - Structural comparison of resource arguments.
//!
//! Two argument trees are compared field by field and every changed scalar
//! leaf is reported under its canonical property path. Changes beneath an
//! immutable field are escalated to their replace variants.

mod engine;
mod result;


pub use engine::*;
pub use result::*;
