//! Domain error types for permission cache operations.

use thiserror::Error;

/// Domain-specific errors.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The holder already has a node with this key and value.
    #[error("node already present: {key}")]
    NodeAlreadyPresent { key: String },

    /// The holder has no node with this key.
    #[error("node not present: {key}")]
    NodeNotPresent { key: String },

    /// A node could not be constructed.
    #[error("invalid node: {message}")]
    InvalidNode { message: String },

    /// The storage collaborator failed.
    #[error("storage error: {message}")]
    Storage { message: String },

    /// A scheduled task was dropped before it reported a result.
    #[error("scheduled task dropped before completion: {task}")]
    TaskDropped { task: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
