//! Error types for the storage adapters

use thiserror::Error;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur while reading or writing job state
#[derive(Error, Debug)]
pub enum StorageError {
    /// Object storage request failed
    #[error("Object storage error: {0}")]
    ObjectStore(String),

    /// Document store query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Week number does not fit the store's column type
    #[error("Week {0} out of range")]
    WeekOutOfRange(u32),
}

impl StorageError {
    /// Create a new object storage error
    pub fn object_store(msg: impl Into<String>) -> Self {
        Self::ObjectStore(msg.into())
    }
}
