//! Expression tree module
//!
//! This module holds the filter tree model: operators, the tagged
//! condition/group node union and the builder that owns and mutates a tree.

mod ast;
pub mod builder;
mod node;


pub use ast::*;
pub use builder::*;
pub use node::*;
