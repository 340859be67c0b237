//! Storage abstraction trait

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte storage abstraction consumed by the upload pipeline.
///
/// Backends hold raw bytes only; the metadata record lives in the database
/// half of the gateway. Keys are owner-scoped (see the crate root
/// documentation) and generated by the `keys` module.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write a file and return its storage key.
    async fn upload(
        &self,
        owner_id: Uuid,
        stored_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String>;

    /// Read a whole file by its storage key.
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Read a file as a stream of chunks, for large files.
    async fn download_stream(
        &self,
        storage_key: &str,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>>;

    /// Remove a file. Deleting a missing key is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the size in bytes of a stored file.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;
}
