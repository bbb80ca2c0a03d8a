use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("IPT2SAT_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[forge]
client_id = "abc"
client_secret = "shh"

[webhook]
callback_host = "https://myapp.example.com"

[storage]
bucket = "ipt2sat-results"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.forge.client_id, "abc");
        assert_eq!(config.storage.bucket, "ipt2sat-results");
    }

    #[test]
    fn test_load_config_from_str_missing_storage() {
        let toml = r#"
[forge]
client_id = "abc"
client_secret = "shh"

[webhook]
callback_host = "https://myapp.example.com"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[forge]
client_id = "abc"
client_secret = "shh"
timeout_secs = 10

[webhook]
callback_host = "https://myapp.example.com"

[storage]
bucket = "ipt2sat-results"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.forge.timeout_secs, 10);
        assert_eq!(config.webhook.callback_host, "https://myapp.example.com");
    }
}
