//! The conversion job submitter.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use tracing::{debug, info, warn};

use crate::auth::{AccessToken, ServiceAuth, UserTokenStore};
use crate::automation::{
    ActivityParameter, ActivitySpec, AliasSpec, AppBundleSpec, AutomationService, ParameterVerb,
    UrlArgument, WorkItemSpec, WorkItemStatus,
};
use crate::config::Config;
use crate::documents::{parse_storage_urn, DocumentService};
use crate::storage::ResultStore;

use super::SubmitError;

/// Unqualified id of the conversion app bundle.
pub const APP_NAME: &str = "IptToSatApp";
/// Filename of the packaged bundle archive under the content root.
pub const BUNDLE_ARCHIVE_NAME: &str = "IptToSatAppBundle.zip";
/// Unqualified id of the conversion activity.
pub const ACTIVITY_NAME: &str = "IptToSatActivity";
/// Alias both the bundle and the activity are published under.
pub const ALIAS: &str = "v1";
/// Engine the bundle and activity are registered against.
pub const ENGINE: &str = "Autodesk.Inventor+23";
/// Fixed output artifact name the activity writes.
pub const OUTPUT_FILENAME: &str = "export.sat";

const INPUT_PARAM: &str = "InventorDoc";
const OUTPUT_PARAM: &str = "export";
const CALLBACK_PARAM: &str = "onComplete";

/// Qualified resource id: `{nickname}.{name}+{alias}`.
pub fn qualified_name(nickname: &str, name: &str, alias: &str) -> String {
    format!("{}.{}+{}", nickname, name, alias)
}

/// URL-safe encoding of a version id, used in filenames and URL paths.
fn encode_version_id(version_id: &str) -> String {
    URL_SAFE_NO_PAD.encode(version_id)
}

/// Orchestrates a single IPT-to-SAT conversion job against the remote
/// automation service.
pub struct ConversionJobSubmitter {
    config: Config,
    auth: Arc<dyn ServiceAuth>,
    user_tokens: Arc<dyn UserTokenStore>,
    automation: Arc<dyn AutomationService>,
    documents: Arc<dyn DocumentService>,
    results: Arc<dyn ResultStore>,
}

impl ConversionJobSubmitter {
    /// Create a new submitter over the given collaborators.
    pub fn new(
        config: Config,
        auth: Arc<dyn ServiceAuth>,
        user_tokens: Arc<dyn UserTokenStore>,
        automation: Arc<dyn AutomationService>,
        documents: Arc<dyn DocumentService>,
        results: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            config,
            auth,
            user_tokens,
            automation,
            documents,
            results,
        }
    }

    fn nickname(&self) -> &str {
        self.config.forge.nickname()
    }

    fn qualified_bundle_id(&self) -> String {
        qualified_name(self.nickname(), APP_NAME, ALIAS)
    }

    fn qualified_activity_id(&self) -> String {
        qualified_name(self.nickname(), ACTIVITY_NAME, ALIAS)
    }

    /// Guarantee the app bundle exists in the remote registry.
    ///
    /// Existence is a substring scan of the listed ids, not an exact match;
    /// any id containing the qualified name short-circuits creation.
    pub async fn ensure_app_bundle(
        &self,
        token: &AccessToken,
        content_root: &Path,
    ) -> Result<(), SubmitError> {
        let qualified = self.qualified_bundle_id();
        let bundles = self.automation.list_app_bundles(token).await?;

        if bundles.iter().any(|id| id.contains(&qualified)) {
            debug!(bundle = %qualified, "App bundle already registered");
            return Ok(());
        }

        // Fail before any remote creation call when the archive is missing.
        let archive_path = content_root.join(BUNDLE_ARCHIVE_NAME);
        if !archive_path.exists() {
            return Err(SubmitError::MissingBundleArchive { path: archive_path });
        }

        let spec = AppBundleSpec {
            id: APP_NAME.to_string(),
            engine: ENGINE.to_string(),
            description: Some("Converts an Inventor part file to SAT".to_string()),
        };
        let details = self.automation.create_app_bundle(token, &spec).await?;

        let alias = AliasSpec {
            id: ALIAS.to_string(),
            version: 1,
        };
        self.automation
            .create_app_bundle_alias(token, APP_NAME, &alias)
            .await?;

        let archive = tokio::fs::read(&archive_path)
            .await
            .map_err(|source| SubmitError::ArchiveRead {
                path: archive_path.clone(),
                source,
            })?;
        self.automation
            .upload_app_bundle(&details.upload_parameters, archive, BUNDLE_ARCHIVE_NAME)
            .await?;

        info!(bundle = %qualified, "App bundle registered and uploaded");
        Ok(())
    }

    /// Guarantee the activity exists in the remote registry, referencing the
    /// app bundle. Same substring idempotency as `ensure_app_bundle`.
    pub async fn ensure_activity(&self, token: &AccessToken) -> Result<(), SubmitError> {
        let qualified = self.qualified_activity_id();
        let activities = self.automation.list_activities(token).await?;

        if activities.iter().any(|id| id.contains(&qualified)) {
            debug!(activity = %qualified, "Activity already registered");
            return Ok(());
        }

        let command_line = format!(
            "$(engine.path)\\\\InventorCoreConsole.exe /i $(args[{}].path) /al $(appbundles[{}].path)",
            INPUT_PARAM, APP_NAME
        );

        let mut parameters = HashMap::new();
        parameters.insert(
            INPUT_PARAM.to_string(),
            ActivityParameter {
                verb: ParameterVerb::Get,
                description: "Input IPT File".to_string(),
                required: true,
                local_name: format!("$({})", INPUT_PARAM),
            },
        );
        parameters.insert(
            OUTPUT_PARAM.to_string(),
            ActivityParameter {
                verb: ParameterVerb::Put,
                description: "Resulting SAT File".to_string(),
                required: true,
                local_name: OUTPUT_FILENAME.to_string(),
            },
        );

        let spec = ActivitySpec {
            id: ACTIVITY_NAME.to_string(),
            command_line: vec![command_line],
            engine: ENGINE.to_string(),
            appbundles: vec![self.qualified_bundle_id()],
            parameters,
            description: None,
        };
        self.automation.create_activity(token, &spec).await?;

        let alias = AliasSpec {
            id: ALIAS.to_string(),
            version: 1,
        };
        self.automation
            .create_activity_alias(token, ACTIVITY_NAME, &alias)
            .await?;

        info!(activity = %qualified, "Activity registered");
        Ok(())
    }

    /// Resolve a project/version pair into a bearer-authorized download
    /// descriptor for the source document.
    pub async fn build_download_url(
        &self,
        user_token: &AccessToken,
        project_id: &str,
        version_id: &str,
    ) -> Result<UrlArgument, SubmitError> {
        let version = self
            .documents
            .get_version(&user_token.token, project_id, version_id)
            .await?;
        let item = self
            .documents
            .get_version_item(&user_token.token, project_id, version_id)
            .await?;
        debug!(item = %item.item_id, storage = %version.storage_id, "Resolved version storage");

        let parsed = parse_storage_urn(&version.storage_id)?;
        let url = format!(
            "{}/oss/v2/buckets/{}/objects/{}",
            self.config.forge.base_url.trim_end_matches('/'),
            parsed.bucket_key,
            parsed.object_name
        );

        Ok(UrlArgument::bearer_get(url, &user_token.token))
    }

    /// Produce a time-limited PUT descriptor for the conversion result,
    /// creating the result bucket when absent.
    pub async fn build_upload_url(
        &self,
        result_filename: &str,
    ) -> Result<UrlArgument, SubmitError> {
        self.results.ensure_bucket().await?;
        let presigned = self.results.presign_upload(result_filename).await?;
        Ok(UrlArgument::put(presigned.url))
    }

    fn callback_url(&self, user_id: &str, project_id: &str, encoded_version: &str) -> String {
        format!(
            "{}/api/forge/callback/designautomation/inventor/{}/{}/{}",
            self.config.webhook.callback_host.trim_end_matches('/'),
            urlencoding::encode(user_id),
            urlencoding::encode(project_id),
            encoded_version
        )
    }

    /// Submit one conversion job end to end and return the remote status
    /// handle. Completion is reported asynchronously to the callback URL;
    /// nothing is tracked locally.
    pub async fn start_conversion_job(
        &self,
        user_id: &str,
        project_id: &str,
        version_id: &str,
        content_root: &Path,
    ) -> Result<WorkItemStatus, SubmitError> {
        let service_token = self.auth.authenticate().await?;

        if self.config.forge.reset_account_on_submit {
            warn!("reset_account_on_submit is set, purging account bundles and activities");
            self.automation.delete_account_data(&service_token).await?;
        }

        let user_token = self.user_tokens.user_token(user_id).await?;

        self.ensure_app_bundle(&service_token, content_root).await?;
        self.ensure_activity(&service_token).await?;

        let encoded_version = encode_version_id(version_id);
        let result_filename = format!("{}.sat", encoded_version);
        let callback = self.callback_url(user_id, project_id, &encoded_version);

        let download = self
            .build_download_url(&user_token, project_id, version_id)
            .await?;
        let upload = self.build_upload_url(&result_filename).await?;

        let mut arguments = HashMap::new();
        arguments.insert(INPUT_PARAM.to_string(), download);
        arguments.insert(OUTPUT_PARAM.to_string(), upload);
        arguments.insert(CALLBACK_PARAM.to_string(), UrlArgument::post(callback));

        let spec = WorkItemSpec {
            activity_id: self.qualified_activity_id(),
            arguments,
        };
        let status = self.automation.create_work_item(&service_token, &spec).await?;

        info!(
            work_item = %status.id,
            status = %status.status,
            project = project_id,
            "Conversion job submitted"
        );
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_format() {
        assert_eq!(
            qualified_name("nick", APP_NAME, ALIAS),
            "nick.IptToSatApp+v1"
        );
        assert_eq!(
            qualified_name("nick", ACTIVITY_NAME, ALIAS),
            "nick.IptToSatActivity+v1"
        );
    }

    #[test]
    fn test_encode_version_id_is_url_safe() {
        let encoded = encode_version_id("urn:adsk.wipprod:fs.file:vf.X?version=1");
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('='));
    }

    #[test]
    fn test_encode_version_id_deterministic() {
        let a = encode_version_id("urn:adsk.wipprod:fs.file:vf.X?version=1");
        let b = encode_version_id("urn:adsk.wipprod:fs.file:vf.X?version=1");
        assert_eq!(a, b);
    }
}
