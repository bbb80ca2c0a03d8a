//! Types for the Design Automation service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::auth::AccessToken;

/// Registration request for an app bundle.
#[derive(Debug, Clone, Serialize)]
pub struct AppBundleSpec {
    /// Unqualified bundle id (e.g., "IptToSatApp").
    pub id: String,
    /// Engine the bundle runs on (e.g., "Autodesk.Inventor+23").
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Where and how to upload a freshly registered bundle archive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParameters {
    /// Target of the multipart form post.
    #[serde(rename = "endpointURL")]
    pub endpoint_url: String,
    /// Opaque form fields the service requires on the post.
    pub form_data: HashMap<String, String>,
}

/// Response to a bundle registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppBundleDetails {
    pub id: String,
    pub version: u32,
    pub upload_parameters: UploadParameters,
}

/// A mutable named pointer to a specific bundle/activity version.
#[derive(Debug, Clone, Serialize)]
pub struct AliasSpec {
    /// Alias name (e.g., "v1").
    pub id: String,
    /// Version the alias points at.
    pub version: u32,
}

/// Direction of an activity parameter.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterVerb {
    Get,
    Put,
}

/// A single input or output binding declared by an activity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityParameter {
    pub verb: ParameterVerb,
    pub description: String,
    pub required: bool,
    /// Path the engine reads/writes inside the working directory.
    pub local_name: String,
}

/// Registration request for an activity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySpec {
    /// Unqualified activity id (e.g., "IptToSatActivity").
    pub id: String,
    pub command_line: Vec<String>,
    pub engine: String,
    /// Qualified bundle references ("{nickname}.{app}+{alias}").
    pub appbundles: Vec<String>,
    pub parameters: HashMap<String, ActivityParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A URL-shaped work item argument (input, output or callback).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlArgument {
    /// HTTP verb the engine uses on the URL. Omitted for plain GET inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
    pub url: String,
    /// Extra headers the engine sends (e.g., Authorization).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl UrlArgument {
    /// A GET input fetched with a bearer token.
    pub fn bearer_get(url: impl Into<String>, token: &str) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        Self {
            verb: None,
            url: url.into(),
            headers: Some(headers),
        }
    }

    /// A pre-authorized PUT output.
    pub fn put(url: impl Into<String>) -> Self {
        Self {
            verb: Some("PUT".to_string()),
            url: url.into(),
            headers: None,
        }
    }

    /// A completion callback POST.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            verb: Some("POST".to_string()),
            url: url.into(),
            headers: None,
        }
    }
}

/// Submission request for a work item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemSpec {
    /// Qualified activity reference ("{nickname}.{activity}+{alias}").
    pub activity_id: String,
    pub arguments: HashMap<String, UrlArgument>,
}

/// Status handle returned by the engine on submission.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemStatus {
    pub id: String,
    pub status: String,
}

/// Errors that can occur when talking to Design Automation.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Design Automation connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Design Automation API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Bundle archive upload failed: {0}")]
    UploadFailed(String),

    #[error("Request timeout")]
    Timeout,
}

/// Client surface of the remote automation service.
#[async_trait]
pub trait AutomationService: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// List qualified ids of every registered app bundle.
    async fn list_app_bundles(&self, token: &AccessToken)
        -> Result<Vec<String>, AutomationError>;

    /// Register a new app bundle; the response carries upload parameters for
    /// the archive.
    async fn create_app_bundle(
        &self,
        token: &AccessToken,
        spec: &AppBundleSpec,
    ) -> Result<AppBundleDetails, AutomationError>;

    /// Create an alias on an app bundle.
    async fn create_app_bundle_alias(
        &self,
        token: &AccessToken,
        bundle_id: &str,
        alias: &AliasSpec,
    ) -> Result<(), AutomationError>;

    /// Upload the packaged archive to a registration's upload target.
    async fn upload_app_bundle(
        &self,
        params: &UploadParameters,
        archive: Vec<u8>,
        filename: &str,
    ) -> Result<(), AutomationError>;

    /// List qualified ids of every registered activity.
    async fn list_activities(&self, token: &AccessToken)
        -> Result<Vec<String>, AutomationError>;

    /// Register a new activity.
    async fn create_activity(
        &self,
        token: &AccessToken,
        spec: &ActivitySpec,
    ) -> Result<(), AutomationError>;

    /// Create an alias on an activity.
    async fn create_activity_alias(
        &self,
        token: &AccessToken,
        activity_id: &str,
        alias: &AliasSpec,
    ) -> Result<(), AutomationError>;

    /// Submit a work item for execution.
    async fn create_work_item(
        &self,
        token: &AccessToken,
        spec: &WorkItemSpec,
    ) -> Result<WorkItemStatus, AutomationError>;

    /// Delete every bundle and activity owned by the account.
    async fn delete_account_data(&self, token: &AccessToken) -> Result<(), AutomationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_argument_bearer_get_serialization() {
        let arg = UrlArgument::bearer_get("https://example.com/doc.ipt", "tok");
        let json = serde_json::to_value(&arg).unwrap();
        assert!(json.get("verb").is_none());
        assert_eq!(json["url"], "https://example.com/doc.ipt");
        assert_eq!(json["headers"]["Authorization"], "Bearer tok");
    }

    #[test]
    fn test_url_argument_put_serialization() {
        let arg = UrlArgument::put("https://bucket.s3/key");
        let json = serde_json::to_value(&arg).unwrap();
        assert_eq!(json["verb"], "PUT");
        assert!(json.get("headers").is_none());
    }

    #[test]
    fn test_activity_parameter_serialization() {
        let param = ActivityParameter {
            verb: ParameterVerb::Get,
            description: "Input IPT File".to_string(),
            required: true,
            local_name: "$(InventorDoc)".to_string(),
        };
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["verb"], "get");
        assert_eq!(json["localName"], "$(InventorDoc)");
        assert_eq!(json["required"], true);
    }

    #[test]
    fn test_work_item_spec_serialization() {
        let mut arguments = HashMap::new();
        arguments.insert("onComplete".to_string(), UrlArgument::post("https://cb"));
        let spec = WorkItemSpec {
            activity_id: "nick.IptToSatActivity+v1".to_string(),
            arguments,
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["activityId"], "nick.IptToSatActivity+v1");
        assert_eq!(json["arguments"]["onComplete"]["verb"], "POST");
    }

    #[test]
    fn test_upload_parameters_deserialization() {
        let json = r#"{
            "endpointURL": "https://uploads.example.com/bundles",
            "formData": {"key": "apps/abc", "policy": "b64"}
        }"#;
        let params: UploadParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.endpoint_url, "https://uploads.example.com/bundles");
        assert_eq!(params.form_data["policy"], "b64");
    }
}
