use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub forge: ForgeConfig,
    pub webhook: WebhookConfig,
    pub storage: StorageConfig,
}

/// Forge (APS) application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForgeConfig {
    /// Application client id (also the default account nickname).
    pub client_id: String,
    /// Application client secret.
    pub client_secret: String,
    /// API base URL (default: https://developer.api.autodesk.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Account nickname used to namespace bundle/activity ids.
    /// Defaults to the client id when not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Delete all bundles and activities for the account before each
    /// submission. Off by default; only useful while developing a bundle.
    #[serde(default)]
    pub reset_account_on_submit: bool,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl ForgeConfig {
    /// Nickname used in qualified bundle/activity ids.
    pub fn nickname(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.client_id)
    }
}

fn default_base_url() -> String {
    "https://developer.api.autodesk.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Completion callback configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookConfig {
    /// Host the remote engine posts completion callbacks to
    /// (e.g., "https://myapp.example.com").
    pub callback_host: String,
}

/// Result object store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Private bucket receiving conversion results.
    pub bucket: String,
    /// AWS region (default: us-west-2).
    #[serde(default = "default_region")]
    pub region: String,
    /// Optional custom endpoint (LocalStack, MinIO).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Validity window of pre-signed upload URLs in seconds (default: 600).
    #[serde(default = "default_upload_expiry")]
    pub upload_expiry_secs: u32,
}

fn default_region() -> String {
    "us-west-2".to_string()
}

fn default_upload_expiry() -> u32 {
    600
}

/// Sanitized config for exposure outside the process (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub forge: SanitizedForgeConfig,
    pub webhook: WebhookConfig,
    pub storage: StorageConfig,
}

/// Sanitized Forge config (client secret hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedForgeConfig {
    pub client_id: String,
    pub client_secret_configured: bool,
    pub base_url: String,
    pub nickname: String,
    pub reset_account_on_submit: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            forge: SanitizedForgeConfig {
                client_id: config.forge.client_id.clone(),
                client_secret_configured: !config.forge.client_secret.is_empty(),
                base_url: config.forge.base_url.clone(),
                nickname: config.forge.nickname().to_string(),
                reset_account_on_submit: config.forge.reset_account_on_submit,
                timeout_secs: config.forge.timeout_secs,
            },
            webhook: config.webhook.clone(),
            storage: config.storage.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
[forge]
client_id = "abc"
client_secret = "shh"

[webhook]
callback_host = "https://myapp.example.com"

[storage]
bucket = "ipt2sat-results"
"#
    }

    #[test]
    fn test_deserialize_minimal_config_applies_defaults() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(config.forge.base_url, "https://developer.api.autodesk.com");
        assert_eq!(config.forge.timeout_secs, 30);
        assert!(!config.forge.reset_account_on_submit);
        assert_eq!(config.storage.region, "us-west-2");
        assert_eq!(config.storage.upload_expiry_secs, 600);
        assert!(config.storage.endpoint.is_none());
    }

    #[test]
    fn test_nickname_defaults_to_client_id() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(config.forge.nickname(), "abc");
    }

    #[test]
    fn test_nickname_override() {
        let toml = r#"
[forge]
client_id = "abc"
client_secret = "shh"
nickname = "myteam"

[webhook]
callback_host = "https://myapp.example.com"

[storage]
bucket = "ipt2sat-results"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.forge.nickname(), "myteam");
    }

    #[test]
    fn test_deserialize_missing_forge_fails() {
        let toml = r#"
[webhook]
callback_host = "https://myapp.example.com"

[storage]
bucket = "ipt2sat-results"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_redacts_secret() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.forge.client_id, "abc");
        assert!(sanitized.forge.client_secret_configured);
        assert_eq!(sanitized.forge.nickname, "abc");

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("shh"));
    }

    #[test]
    fn test_deserialize_storage_overrides() {
        let toml = r#"
[forge]
client_id = "abc"
client_secret = "shh"

[webhook]
callback_host = "https://myapp.example.com"

[storage]
bucket = "ipt2sat-results"
region = "eu-west-1"
endpoint = "http://localhost:4566"
upload_expiry_secs = 120
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.region, "eu-west-1");
        assert_eq!(
            config.storage.endpoint.as_deref(),
            Some("http://localhost:4566")
        );
        assert_eq!(config.storage.upload_expiry_secs, 120);
    }
}
