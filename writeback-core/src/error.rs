/*!
Error types for the writeback core engine.
*/

use thiserror::Error;

/// Result type used throughout the writeback core.
pub type Result<T> = std::result::Result<T, WritebackError>;

/// Errors that can occur during hydration and write-through operations.
#[derive(Error, Debug)]
pub enum WritebackError {
    /// I/O errors from file-backed storage adapters
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage adapter errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Persisted payload parsed but does not have the expected shape
    #[error("Invalid persisted format: {0}")]
    InvalidFormat(String),
}

impl WritebackError {
    /// Create a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new invalid format error
    pub fn invalid_format<S: Into<String>>(msg: S) -> Self {
        Self::InvalidFormat(msg.into())
    }
}
