pub mod auth;
pub mod automation;
pub mod config;
pub mod documents;
pub mod storage;
pub mod submitter;
pub mod testing;

pub use auth::{AccessToken, AuthError, ForgeAuth, ServiceAuth, UserTokenStore};
pub use automation::{
    AutomationError, AutomationService, ForgeAutomationClient, UrlArgument, WorkItemSpec,
    WorkItemStatus,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use documents::{
    parse_storage_urn, DocsError, DocumentService, ForgeDocsClient, StorageUrnError,
};
pub use storage::{PresignedUpload, ResultStore, S3ResultStore, StorageError};
pub use submitter::{ConversionJobSubmitter, SubmitError, SubmitErrorKind};
