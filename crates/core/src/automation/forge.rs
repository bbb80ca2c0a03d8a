//! Forge Design Automation v3 client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::AccessToken;
use crate::config::ForgeConfig;

use super::{
    ActivitySpec, AliasSpec, AppBundleDetails, AppBundleSpec, AutomationError, AutomationService,
    UploadParameters, WorkItemSpec, WorkItemStatus,
};

/// A page of listed resource ids.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageString {
    data: Vec<String>,
    pagination_token: Option<String>,
}

/// Design Automation v3 client.
pub struct ForgeAutomationClient {
    client: Client,
    config: ForgeConfig,
}

impl ForgeAutomationClient {
    /// Create a new Design Automation client.
    pub fn new(config: ForgeConfig) -> Result<Self, AutomationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| AutomationError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/da/us-east/v3{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    fn map_send_error(e: reqwest::Error) -> AutomationError {
        if e.is_timeout() {
            AutomationError::Timeout
        } else {
            AutomationError::ConnectionFailed(e.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AutomationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutomationError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(500).collect::<String>(),
            });
        }
        Ok(response)
    }

    /// Collect every id from a paginated list endpoint.
    async fn list_ids(
        &self,
        token: &AccessToken,
        path: &str,
    ) -> Result<Vec<String>, AutomationError> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.api_url(path))
                .header("Authorization", token.bearer());
            if let Some(ref t) = page_token {
                request = request.query(&[("page", t.as_str())]);
            }

            let response = request.send().await.map_err(Self::map_send_error)?;
            let response = Self::check_status(response).await?;

            let page: PageString = response
                .json()
                .await
                .map_err(|e| AutomationError::ParseError(format!("{} list: {}", path, e)))?;

            ids.extend(page.data);

            match page.pagination_token {
                Some(t) if !t.is_empty() => page_token = Some(t),
                _ => break,
            }
        }

        Ok(ids)
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        token: &AccessToken,
        path: &str,
        body: &B,
    ) -> Result<R, AutomationError> {
        let response = self
            .client
            .post(self.api_url(path))
            .header("Authorization", token.bearer())
            .json(body)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| AutomationError::ParseError(format!("{}: {}", path, e)))
    }

    async fn post_json_no_response<B: Serialize>(
        &self,
        token: &AccessToken,
        path: &str,
        body: &B,
    ) -> Result<(), AutomationError> {
        let response = self
            .client
            .post(self.api_url(path))
            .header("Authorization", token.bearer())
            .json(body)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AutomationService for ForgeAutomationClient {
    fn name(&self) -> &str {
        "forge-design-automation"
    }

    async fn list_app_bundles(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<String>, AutomationError> {
        let ids = self.list_ids(token, "/appbundles").await?;
        debug!(count = ids.len(), "Listed app bundles");
        Ok(ids)
    }

    async fn create_app_bundle(
        &self,
        token: &AccessToken,
        spec: &AppBundleSpec,
    ) -> Result<AppBundleDetails, AutomationError> {
        debug!(id = %spec.id, engine = %spec.engine, "Registering app bundle");
        self.post_json(token, "/appbundles", spec).await
    }

    async fn create_app_bundle_alias(
        &self,
        token: &AccessToken,
        bundle_id: &str,
        alias: &AliasSpec,
    ) -> Result<(), AutomationError> {
        let path = format!("/appbundles/{}/aliases", bundle_id);
        debug!(bundle = bundle_id, alias = %alias.id, "Creating bundle alias");
        self.post_json_no_response(token, &path, alias).await
    }

    async fn upload_app_bundle(
        &self,
        params: &UploadParameters,
        archive: Vec<u8>,
        filename: &str,
    ) -> Result<(), AutomationError> {
        // The upload target is a pre-signed form post, no bearer token. Form
        // fields come verbatim from the registration response and must
        // precede the file part.
        let mut form = multipart::Form::new();
        for (key, value) in &params.form_data {
            form = form.text(key.clone(), value.clone());
        }
        let file_part = multipart::Part::bytes(archive)
            .file_name(filename.to_string())
            .mime_str("application/zip")
            .map_err(|e| AutomationError::UploadFailed(e.to_string()))?;
        form = form.part("file", file_part);

        debug!(endpoint = %params.endpoint_url, "Uploading bundle archive");

        let response = self
            .client
            .post(&params.endpoint_url)
            .header("Cache-Control", "no-cache")
            .multipart(form)
            .send()
            .await
            .map_err(|e| AutomationError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Bundle archive upload rejected");
            return Err(AutomationError::UploadFailed(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(())
    }

    async fn list_activities(&self, token: &AccessToken) -> Result<Vec<String>, AutomationError> {
        let ids = self.list_ids(token, "/activities").await?;
        debug!(count = ids.len(), "Listed activities");
        Ok(ids)
    }

    async fn create_activity(
        &self,
        token: &AccessToken,
        spec: &ActivitySpec,
    ) -> Result<(), AutomationError> {
        debug!(id = %spec.id, engine = %spec.engine, "Registering activity");
        self.post_json_no_response(token, "/activities", spec).await
    }

    async fn create_activity_alias(
        &self,
        token: &AccessToken,
        activity_id: &str,
        alias: &AliasSpec,
    ) -> Result<(), AutomationError> {
        let path = format!("/activities/{}/aliases", activity_id);
        debug!(activity = activity_id, alias = %alias.id, "Creating activity alias");
        self.post_json_no_response(token, &path, alias).await
    }

    async fn create_work_item(
        &self,
        token: &AccessToken,
        spec: &WorkItemSpec,
    ) -> Result<WorkItemStatus, AutomationError> {
        debug!(activity = %spec.activity_id, "Submitting work item");
        let status: WorkItemStatus = self.post_json(token, "/workitems", spec).await?;
        debug!(id = %status.id, status = %status.status, "Work item accepted");
        Ok(status)
    }

    async fn delete_account_data(&self, token: &AccessToken) -> Result<(), AutomationError> {
        warn!("Deleting all bundles and activities for this account");
        let response = self
            .client
            .delete(self.api_url("/forgeapps/me"))
            .header("Authorization", token.bearer())
            .send()
            .await
            .map_err(Self::map_send_error)?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForgeConfig;

    fn test_config() -> ForgeConfig {
        ForgeConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            base_url: "https://developer.api.autodesk.com/".to_string(), // trailing slash
            nickname: None,
            reset_account_on_submit: false,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_api_url_strips_trailing_slash() {
        let client = ForgeAutomationClient::new(test_config()).unwrap();
        assert_eq!(
            client.api_url("/appbundles"),
            "https://developer.api.autodesk.com/da/us-east/v3/appbundles"
        );
    }

    #[test]
    fn test_page_deserialization() {
        let json = r#"{"data": ["a.X+v1", "a.Y+v1"], "paginationToken": "next"}"#;
        let page: PageString = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination_token.as_deref(), Some("next"));
    }

    #[test]
    fn test_page_deserialization_without_token() {
        let json = r#"{"data": []}"#;
        let page: PageString = serde_json::from_str(json).unwrap();
        assert!(page.data.is_empty());
        assert!(page.pagination_token.is_none());
    }
}
