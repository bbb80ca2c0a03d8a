//! Two-legged OAuth client for the Forge authentication service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::ForgeConfig;

use super::{AccessToken, AuthError, ServiceAuth};

/// Scope required for Design Automation calls.
const TOKEN_SCOPE: &str = "code:all data:read data:write";

/// Client-credentials token client.
pub struct ForgeAuth {
    client: Client,
    config: ForgeConfig,
}

impl ForgeAuth {
    /// Create a new token client.
    pub fn new(config: ForgeConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| AuthError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[async_trait]
impl ServiceAuth for ForgeAuth {
    async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        let url = format!("{}/authentication/v2/token", self.base_url());

        let params = [
            ("grant_type", "client_credentials"),
            ("scope", TOKEN_SCOPE),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::Timeout
                } else if e.is_connect() {
                    AuthError::ConnectionFailed(e.to_string())
                } else {
                    AuthError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected(
                body.chars().take(200).collect::<String>(),
            ));
        }
        if !status.is_success() {
            return Err(AuthError::ApiError(format!("HTTP {}", status)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ApiError(format!("Failed to parse token response: {}", e)))?;

        debug!(expires_in = token.expires_in, "Obtained app access token");

        Ok(AccessToken::new(token.access_token, token.expires_in))
    }
}
