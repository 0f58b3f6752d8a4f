//! Error types for the index.

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while building or inspecting an index
#[derive(Error, Debug)]
pub enum IndexError {
    /// Requested maximum degree is below the supported minimum
    #[error("Invalid max degree {degree}: must be at least {min}")]
    InvalidDegree { degree: usize, min: usize },

    /// Insert was called with a key that is already present
    #[error("Duplicate key: the key is already present in the index")]
    DuplicateKey,

    /// A structural check found the tree in an inconsistent state
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// I/O error while exporting a diagram or reading input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IndexError {
    /// Create an invariant violation error with a message
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
