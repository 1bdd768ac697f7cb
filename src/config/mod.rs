//! Schema configuration module
//!
//! Builds a [`SchemaRegistry`](crate::field::SchemaRegistry) from a JSON
//! schema document, or infers one from sample records.

mod infer;
mod schema;

pub use infer::*;
pub use schema::*;
