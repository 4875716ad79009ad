//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No credentials found: {0}")]
    NoCredentials(String),

    #[error("Incomplete credentials provided: {0}")]
    PartialCredentials(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

impl StorageError {
    pub fn no_credentials(msg: impl Into<String>) -> Self {
        Self::NoCredentials(msg.into())
    }

    pub fn partial_credentials(msg: impl Into<String>) -> Self {
        Self::PartialCredentials(msg.into())
    }

    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    /// Whether this error came from resolving credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::NoCredentials(_) | Self::PartialCredentials(_))
    }
}
