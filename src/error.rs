//! Error types for the filter expression engine

use crate::condition::{NodeId, Operator};
use thiserror::Error;

/// Main error type for the filter expression engine
///
/// Validation problems are never reported through this type; they are
/// returned as data on the nodes themselves. These variants cover builder
/// misuse and inputs whose structure cannot be trusted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node is not a group: {0}")]
    NotAGroup(NodeId),

    #[error("Invalid root operator: {0} (expected And or Or)")]
    InvalidRootOperator(Operator),

    #[error("Cannot move node {0} into its own subtree")]
    MoveIntoDescendant(NodeId),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::Deserialization(err.to_string())
    }
}

/// Result type alias for the filter expression engine
pub type Result<T> = std::result::Result<T, FilterError>;
