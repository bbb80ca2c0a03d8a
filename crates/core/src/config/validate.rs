use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Forge credentials are non-empty
/// - Callback host and result bucket are non-empty
/// - Upload expiry window is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.forge.client_id.is_empty() {
        return Err(ConfigError::ValidationError(
            "forge.client_id cannot be empty".to_string(),
        ));
    }
    if config.forge.client_secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "forge.client_secret cannot be empty".to_string(),
        ));
    }
    if config.webhook.callback_host.is_empty() {
        return Err(ConfigError::ValidationError(
            "webhook.callback_host cannot be empty".to_string(),
        ));
    }
    if config.storage.bucket.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.bucket cannot be empty".to_string(),
        ));
    }
    if config.storage.upload_expiry_secs == 0 {
        return Err(ConfigError::ValidationError(
            "storage.upload_expiry_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
