//! Mock result store.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{PresignedUpload, ResultStore, StorageError};

/// Mock implementation of the ResultStore trait.
///
/// Generated URLs carry an `X-Amz-Expires` query parameter matching the
/// configured window, mirroring what the real presigner embeds.
pub struct MockResultStore {
    bucket: String,
    expiry_secs: Arc<RwLock<u32>>,
    bucket_exists: Arc<RwLock<bool>>,
    ensure_bucket_calls: Arc<RwLock<usize>>,
    presigned_objects: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<StorageError>>>,
}

impl Default for MockResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResultStore {
    /// Create a mock over a non-existent bucket with the default 10 minute
    /// expiry window.
    pub fn new() -> Self {
        Self::with_bucket("mock-results")
    }

    /// Create a mock over a named bucket.
    pub fn with_bucket(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            expiry_secs: Arc::new(RwLock::new(600)),
            bucket_exists: Arc::new(RwLock::new(false)),
            ensure_bucket_calls: Arc::new(RwLock::new(0)),
            presigned_objects: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Change the expiry window for subsequent presign calls.
    pub async fn set_expiry_secs(&self, secs: u32) {
        *self.expiry_secs.write().await = secs;
    }

    /// Mark the bucket as already existing.
    pub async fn set_bucket_exists(&self, exists: bool) {
        *self.bucket_exists.write().await = exists;
    }

    pub async fn bucket_exists(&self) -> bool {
        *self.bucket_exists.read().await
    }

    pub async fn ensure_bucket_call_count(&self) -> usize {
        *self.ensure_bucket_calls.read().await
    }

    /// Object names presigned so far, in order.
    pub async fn presigned_objects(&self) -> Vec<String> {
        self.presigned_objects.read().await.clone()
    }

    /// Configure the next call to fail.
    pub async fn set_next_error(&self, error: StorageError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl ResultStore for MockResultStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        *self.ensure_bucket_calls.write().await += 1;
        *self.bucket_exists.write().await = true;
        Ok(())
    }

    async fn presign_upload(&self, object_name: &str) -> Result<PresignedUpload, StorageError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        self.presigned_objects
            .write()
            .await
            .push(object_name.to_string());

        let expiry_secs = *self.expiry_secs.read().await;
        let url = format!(
            "https://{}.s3.amazonaws.com/{}?X-Amz-Expires={}&X-Amz-Signature=mock",
            self.bucket,
            urlencoding::encode(object_name),
            expiry_secs
        );

        Ok(PresignedUpload {
            url,
            expires_at: Utc::now() + chrono::Duration::seconds(expiry_secs as i64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_bucket_creates_once_logically() {
        let store = MockResultStore::new();
        assert!(!store.bucket_exists().await);
        store.ensure_bucket().await.unwrap();
        store.ensure_bucket().await.unwrap();
        assert!(store.bucket_exists().await);
        assert_eq!(store.ensure_bucket_call_count().await, 2);
    }

    #[tokio::test]
    async fn test_presign_embeds_expiry() {
        let store = MockResultStore::new();
        let upload = store.presign_upload("result.sat").await.unwrap();
        assert!(upload.url.contains("X-Amz-Expires=600"));
        assert_eq!(store.presigned_objects().await, vec!["result.sat"]);
    }

    #[tokio::test]
    async fn test_error_injection() {
        let store = MockResultStore::new();
        store
            .set_next_error(StorageError::ConnectionError("down".to_string()))
            .await;
        assert!(store.ensure_bucket().await.is_err());
        assert!(store.ensure_bucket().await.is_ok());
    }
}
