/// Core error types for History Dreams
use thiserror::Error;

/// Result type alias using `DreamsError`
pub type Result<T> = std::result::Result<T, DreamsError>;

/// Core error type for History Dreams
#[derive(Error, Debug)]
pub enum DreamsError {
    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl DreamsError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
