/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend refused the operation (quota, permissions, missing medium)
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    /// Persisted data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<StorageError> for vibewave_core::VibeError {
    fn from(err: StorageError) -> Self {
        vibewave_core::VibeError::storage(err.to_string())
    }
}
