use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Download the object stored under `key` to a local path
    async fn download(&self, key: &str, local_path: &Path) -> Result<(), StorageError>;

    /// Upload a file from a local path to storage, overwriting `key`
    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), StorageError>;

    /// Issue a time-limited URL granting GET access to `key`
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;
}
