//! Mock Design Automation service.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::AccessToken;
use crate::automation::{
    ActivitySpec, AliasSpec, AppBundleDetails, AppBundleSpec, AutomationError, AutomationService,
    UploadParameters, WorkItemSpec, WorkItemStatus,
};

/// A recorded archive upload.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub endpoint_url: String,
    pub filename: String,
    pub byte_len: usize,
}

/// Mock implementation of the AutomationService trait.
///
/// Listings are fully test-controlled: creating a bundle or activity does
/// NOT add it to the listing, so idempotency tests decide for themselves
/// what a subsequent list call observes.
pub struct MockAutomationService {
    app_bundles: Arc<RwLock<Vec<String>>>,
    activities: Arc<RwLock<Vec<String>>>,
    upload_parameters: Arc<RwLock<UploadParameters>>,
    work_item_status: Arc<RwLock<WorkItemStatus>>,

    created_bundles: Arc<RwLock<Vec<AppBundleSpec>>>,
    bundle_aliases: Arc<RwLock<Vec<(String, AliasSpec)>>>,
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    created_activities: Arc<RwLock<Vec<ActivitySpec>>>,
    activity_aliases: Arc<RwLock<Vec<(String, AliasSpec)>>>,
    work_items: Arc<RwLock<Vec<WorkItemSpec>>>,
    account_deletes: Arc<RwLock<usize>>,

    next_error: Arc<RwLock<Option<AutomationError>>>,
}

impl Default for MockAutomationService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAutomationService {
    /// Create a mock with empty listings.
    pub fn new() -> Self {
        let mut form_data = HashMap::new();
        form_data.insert("key".to_string(), "apps/mock".to_string());
        form_data.insert("policy".to_string(), "mock-policy".to_string());

        Self {
            app_bundles: Arc::new(RwLock::new(Vec::new())),
            activities: Arc::new(RwLock::new(Vec::new())),
            upload_parameters: Arc::new(RwLock::new(UploadParameters {
                endpoint_url: "https://uploads.example.com/bundles".to_string(),
                form_data,
            })),
            work_item_status: Arc::new(RwLock::new(WorkItemStatus {
                id: "wi-1".to_string(),
                status: "pending".to_string(),
            })),
            created_bundles: Arc::new(RwLock::new(Vec::new())),
            bundle_aliases: Arc::new(RwLock::new(Vec::new())),
            uploads: Arc::new(RwLock::new(Vec::new())),
            created_activities: Arc::new(RwLock::new(Vec::new())),
            activity_aliases: Arc::new(RwLock::new(Vec::new())),
            work_items: Arc::new(RwLock::new(Vec::new())),
            account_deletes: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the bundle listing returned by subsequent list calls.
    pub async fn set_app_bundles(&self, ids: Vec<String>) {
        *self.app_bundles.write().await = ids;
    }

    /// Replace the activity listing returned by subsequent list calls.
    pub async fn set_activities(&self, ids: Vec<String>) {
        *self.activities.write().await = ids;
    }

    /// Replace the status handle returned on work item submission.
    pub async fn set_work_item_status(&self, status: WorkItemStatus) {
        *self.work_item_status.write().await = status;
    }

    /// Configure the next call to fail.
    pub async fn set_next_error(&self, error: AutomationError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn created_bundles(&self) -> Vec<AppBundleSpec> {
        self.created_bundles.read().await.clone()
    }

    pub async fn bundle_aliases(&self) -> Vec<(String, AliasSpec)> {
        self.bundle_aliases.read().await.clone()
    }

    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    pub async fn created_activities(&self) -> Vec<ActivitySpec> {
        self.created_activities.read().await.clone()
    }

    pub async fn activity_aliases(&self) -> Vec<(String, AliasSpec)> {
        self.activity_aliases.read().await.clone()
    }

    pub async fn submitted_work_items(&self) -> Vec<WorkItemSpec> {
        self.work_items.read().await.clone()
    }

    pub async fn account_delete_count(&self) -> usize {
        *self.account_deletes.read().await
    }

    async fn take_error(&self) -> Option<AutomationError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl AutomationService for MockAutomationService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_app_bundles(
        &self,
        _token: &AccessToken,
    ) -> Result<Vec<String>, AutomationError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.app_bundles.read().await.clone())
    }

    async fn create_app_bundle(
        &self,
        _token: &AccessToken,
        spec: &AppBundleSpec,
    ) -> Result<AppBundleDetails, AutomationError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.created_bundles.write().await.push(spec.clone());
        Ok(AppBundleDetails {
            id: spec.id.clone(),
            version: 1,
            upload_parameters: self.upload_parameters.read().await.clone(),
        })
    }

    async fn create_app_bundle_alias(
        &self,
        _token: &AccessToken,
        bundle_id: &str,
        alias: &AliasSpec,
    ) -> Result<(), AutomationError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.bundle_aliases
            .write()
            .await
            .push((bundle_id.to_string(), alias.clone()));
        Ok(())
    }

    async fn upload_app_bundle(
        &self,
        params: &UploadParameters,
        archive: Vec<u8>,
        filename: &str,
    ) -> Result<(), AutomationError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.uploads.write().await.push(RecordedUpload {
            endpoint_url: params.endpoint_url.clone(),
            filename: filename.to_string(),
            byte_len: archive.len(),
        });
        Ok(())
    }

    async fn list_activities(&self, _token: &AccessToken) -> Result<Vec<String>, AutomationError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.activities.read().await.clone())
    }

    async fn create_activity(
        &self,
        _token: &AccessToken,
        spec: &ActivitySpec,
    ) -> Result<(), AutomationError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.created_activities.write().await.push(spec.clone());
        Ok(())
    }

    async fn create_activity_alias(
        &self,
        _token: &AccessToken,
        activity_id: &str,
        alias: &AliasSpec,
    ) -> Result<(), AutomationError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.activity_aliases
            .write()
            .await
            .push((activity_id.to_string(), alias.clone()));
        Ok(())
    }

    async fn create_work_item(
        &self,
        _token: &AccessToken,
        spec: &WorkItemSpec,
    ) -> Result<WorkItemStatus, AutomationError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.work_items.write().await.push(spec.clone());
        Ok(self.work_item_status.read().await.clone())
    }

    async fn delete_account_data(&self, _token: &AccessToken) -> Result<(), AutomationError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        *self.account_deletes.write().await += 1;
        self.app_bundles.write().await.clear();
        self.activities.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> AccessToken {
        AccessToken::new("t", 3600)
    }

    #[tokio::test]
    async fn test_listing_is_test_controlled() {
        let mock = MockAutomationService::new();
        let spec = AppBundleSpec {
            id: "IptToSatApp".to_string(),
            engine: "Autodesk.Inventor+23".to_string(),
            description: None,
        };
        mock.create_app_bundle(&token(), &spec).await.unwrap();

        // Creation does not surface in the listing until the test says so.
        assert!(mock.list_app_bundles(&token()).await.unwrap().is_empty());

        mock.set_app_bundles(vec!["nick.IptToSatApp+v1".to_string()])
            .await;
        assert_eq!(mock.list_app_bundles(&token()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_error_injection_is_one_shot() {
        let mock = MockAutomationService::new();
        mock.set_next_error(AutomationError::Timeout).await;
        assert!(mock.list_app_bundles(&token()).await.is_err());
        assert!(mock.list_app_bundles(&token()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_account_clears_listings() {
        let mock = MockAutomationService::new();
        mock.set_app_bundles(vec!["a".to_string()]).await;
        mock.set_activities(vec!["b".to_string()]).await;
        mock.delete_account_data(&token()).await.unwrap();
        assert!(mock.list_app_bundles(&token()).await.unwrap().is_empty());
        assert!(mock.list_activities(&token()).await.unwrap().is_empty());
        assert_eq!(mock.account_delete_count().await, 1);
    }
}
