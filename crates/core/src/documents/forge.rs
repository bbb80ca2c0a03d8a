//! Forge Data Management client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{DocsError, DocumentService, VersionDetails, VersionItem};

/// Data Management v1 client.
pub struct ForgeDocsClient {
    client: Client,
    base_url: String,
}

impl ForgeDocsClient {
    /// Create a new document-management client.
    pub fn new(base_url: impl Into<String>, timeout_secs: u32) -> Result<Self, DocsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()
            .map_err(|e| DocsError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn version_url(&self, project_id: &str, version_id: &str, suffix: &str) -> String {
        format!(
            "{}/data/v1/projects/{}/versions/{}{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(project_id),
            urlencoding::encode(version_id),
            suffix
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        user_token: &str,
        url: &str,
        version_id: &str,
    ) -> Result<T, DocsError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", user_token))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DocsError::Timeout
                } else {
                    DocsError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(DocsError::VersionNotFound(version_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocsError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(500).collect::<String>(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| DocsError::ParseError(e.to_string()))
    }
}

// Data Management API response shapes (only the fields consumed).

#[derive(Debug, Deserialize)]
struct VersionResponse {
    data: VersionData,
}

#[derive(Debug, Deserialize)]
struct VersionData {
    relationships: VersionRelationships,
}

#[derive(Debug, Deserialize)]
struct VersionRelationships {
    storage: RelationshipRef,
}

#[derive(Debug, Deserialize)]
struct RelationshipRef {
    data: RelationshipData,
}

#[derive(Debug, Deserialize)]
struct RelationshipData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct VersionItemResponse {
    data: VersionItemData,
}

#[derive(Debug, Deserialize)]
struct VersionItemData {
    id: String,
}

#[async_trait]
impl DocumentService for ForgeDocsClient {
    fn name(&self) -> &str {
        "forge-data-management"
    }

    async fn get_version(
        &self,
        user_token: &str,
        project_id: &str,
        version_id: &str,
    ) -> Result<VersionDetails, DocsError> {
        let url = self.version_url(project_id, version_id, "");
        debug!(project = project_id, version = version_id, "Fetching version");

        let response: VersionResponse = self.get_json(user_token, &url, version_id).await?;

        Ok(VersionDetails {
            storage_id: response.data.relationships.storage.data.id,
        })
    }

    async fn get_version_item(
        &self,
        user_token: &str,
        project_id: &str,
        version_id: &str,
    ) -> Result<VersionItem, DocsError> {
        let url = self.version_url(project_id, version_id, "/item");
        debug!(
            project = project_id,
            version = version_id,
            "Fetching version item"
        );

        let response: VersionItemResponse = self.get_json(user_token, &url, version_id).await?;

        Ok(VersionItem {
            item_id: response.data.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_url_encodes_ids() {
        let client = ForgeDocsClient::new("https://developer.api.autodesk.com/", 30).unwrap();
        let url = client.version_url("b.project", "urn:adsk.wipprod:fs.file:vf.X?version=1", "");
        assert!(url.starts_with(
            "https://developer.api.autodesk.com/data/v1/projects/b.project/versions/"
        ));
        assert!(!url.contains('?'));
        assert!(url.contains("urn%3Aadsk.wipprod"));
    }

    #[test]
    fn test_version_response_deserialization() {
        let json = r#"{
            "data": {
                "relationships": {
                    "storage": {
                        "data": {"id": "urn:adsk.objects:os.object:wip.dm.prod/doc.ipt"}
                    }
                }
            }
        }"#;
        let response: VersionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.data.relationships.storage.data.id,
            "urn:adsk.objects:os.object:wip.dm.prod/doc.ipt"
        );
    }

    #[test]
    fn test_version_item_response_deserialization() {
        let json = r#"{"data": {"id": "urn:adsk.wipprod:dm.lineage:abc"}}"#;
        let response: VersionItemResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.id, "urn:adsk.wipprod:dm.lineage:abc");
    }
}
