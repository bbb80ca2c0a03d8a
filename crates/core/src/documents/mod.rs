//! Source document-management service abstraction.
//!
//! Versions live in the document-management service; their binary content
//! lives in object storage, referenced through a storage identifier on the
//! version's relationships. This module looks versions up and parses that
//! identifier into a directly fetchable object address.

mod forge;
mod urn;

pub use forge::ForgeDocsClient;
pub use urn::{parse_storage_urn, ParsedStorage, StorageUrnError};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying document management.
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("Document service connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Document service API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Version metadata consumed by the submitter.
#[derive(Debug, Clone)]
pub struct VersionDetails {
    /// Storage identifier from the version's storage relationship
    /// (slash/colon-delimited urn).
    pub storage_id: String,
}

/// Item metadata tied to a version.
#[derive(Debug, Clone)]
pub struct VersionItem {
    pub item_id: String,
}

/// Client surface of the document-management service.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Fetch version metadata for a project/version pair.
    async fn get_version(
        &self,
        user_token: &str,
        project_id: &str,
        version_id: &str,
    ) -> Result<VersionDetails, DocsError>;

    /// Fetch the item a version belongs to.
    async fn get_version_item(
        &self,
        user_token: &str,
        project_id: &str,
        version_id: &str,
    ) -> Result<VersionItem, DocsError>;
}
