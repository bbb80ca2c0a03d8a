//! Mock document-management service.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::documents::{DocsError, DocumentService, VersionDetails, VersionItem};

/// Mock implementation of the DocumentService trait.
pub struct MockDocumentService {
    /// (project_id, version_id) -> storage id
    storage_ids: Arc<RwLock<HashMap<(String, String), String>>>,
    version_calls: Arc<RwLock<Vec<(String, String)>>>,
    version_item_calls: Arc<RwLock<Vec<(String, String)>>>,
    next_error: Arc<RwLock<Option<DocsError>>>,
}

impl Default for MockDocumentService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDocumentService {
    /// Create an empty mock; unknown versions fail with VersionNotFound.
    pub fn new() -> Self {
        Self {
            storage_ids: Arc::new(RwLock::new(HashMap::new())),
            version_calls: Arc::new(RwLock::new(Vec::new())),
            version_item_calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Register a version with the storage id its lookup returns.
    pub async fn insert_version(&self, project_id: &str, version_id: &str, storage_id: &str) {
        self.storage_ids.write().await.insert(
            (project_id.to_string(), version_id.to_string()),
            storage_id.to_string(),
        );
    }

    /// Configure the next call to fail.
    pub async fn set_next_error(&self, error: DocsError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn version_call_count(&self) -> usize {
        self.version_calls.read().await.len()
    }

    pub async fn version_item_call_count(&self) -> usize {
        self.version_item_calls.read().await.len()
    }
}

#[async_trait]
impl DocumentService for MockDocumentService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_version(
        &self,
        _user_token: &str,
        project_id: &str,
        version_id: &str,
    ) -> Result<VersionDetails, DocsError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        self.version_calls
            .write()
            .await
            .push((project_id.to_string(), version_id.to_string()));

        self.storage_ids
            .read()
            .await
            .get(&(project_id.to_string(), version_id.to_string()))
            .map(|storage_id| VersionDetails {
                storage_id: storage_id.clone(),
            })
            .ok_or_else(|| DocsError::VersionNotFound(version_id.to_string()))
    }

    async fn get_version_item(
        &self,
        _user_token: &str,
        project_id: &str,
        version_id: &str,
    ) -> Result<VersionItem, DocsError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        self.version_item_calls
            .write()
            .await
            .push((project_id.to_string(), version_id.to_string()));

        if !self
            .storage_ids
            .read()
            .await
            .contains_key(&(project_id.to_string(), version_id.to_string()))
        {
            return Err(DocsError::VersionNotFound(version_id.to_string()));
        }

        Ok(VersionItem {
            item_id: format!("item-of-{}", version_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_version_fails() {
        let docs = MockDocumentService::new();
        let err = docs.get_version("t", "p", "v").await.unwrap_err();
        assert!(matches!(err, DocsError::VersionNotFound(_)));
    }

    #[tokio::test]
    async fn test_known_version_returns_storage_id() {
        let docs = MockDocumentService::new();
        docs.insert_version("p", "v", "urn:x:bucket/obj.ipt").await;
        let details = docs.get_version("t", "p", "v").await.unwrap();
        assert_eq!(details.storage_id, "urn:x:bucket/obj.ipt");
        assert_eq!(docs.version_call_count().await, 1);
    }
}
