//! Field type registry module
//!
//! Maps field names to their value kind, legal operators and option sets.

mod kind;
pub mod registry;

pub use kind::*;
pub use registry::*;
