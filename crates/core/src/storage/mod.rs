//! Result object store abstraction.
//!
//! Converted artifacts land in a private bucket the remote engine writes to
//! through a pre-signed PUT URL. The `ResultStore` trait covers bucket
//! bootstrap and URL generation; the S3 implementation lives in `s3`.

mod s3;

pub use s3::S3ResultStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur against the result store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage connection failed: {0}")]
    ConnectionError(String),

    #[error("Storage service error: {0}")]
    ServiceError(String),

    #[error("Storage configuration error: {0}")]
    ConfigurationError(String),
}

/// A time-limited PUT target for a conversion result.
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    /// Fully signed URL; credential-embedded, used once by the engine.
    pub url: String,
    /// When the URL stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Private object store receiving conversion results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Make sure the result bucket exists, creating it when absent.
    /// Idempotent at the storage-service level.
    async fn ensure_bucket(&self) -> Result<(), StorageError>;

    /// Generate a pre-signed PUT URL for an object, valid for the configured
    /// expiry window.
    async fn presign_upload(&self, object_name: &str) -> Result<PresignedUpload, StorageError>;
}
