//! Forge authentication.
//!
//! Two-legged OAuth (client credentials) for service-level calls against
//! Design Automation, plus the seam through which stored per-user tokens are
//! obtained. Where those user tokens live (database, session store) is the
//! caller's concern, not this crate's.

mod forge;

pub use forge::ForgeAuth;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while obtaining tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication service connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication rejected: {0}")]
    Rejected(String),

    #[error("Authentication service API error: {0}")]
    ApiError(String),

    #[error("No stored credentials for user: {0}")]
    CredentialsNotFound(String),

    #[error("Request timeout")]
    Timeout,
}

/// A bearer access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The raw token value.
    pub token: String,
    /// Seconds until expiry, as reported by the token endpoint.
    pub expires_in_secs: u64,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_in_secs: u64) -> Self {
        Self {
            token: token.into(),
            expires_in_secs,
        }
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Service-level (two-legged) authentication.
#[async_trait]
pub trait ServiceAuth: Send + Sync {
    /// Obtain an app access token via the client-credentials grant.
    async fn authenticate(&self) -> Result<AccessToken, AuthError>;
}

/// Source of stored per-user access tokens.
///
/// The production implementation lives with the embedding application; this
/// crate only consumes it when building the authorized download URL.
#[async_trait]
pub trait UserTokenStore: Send + Sync {
    /// Look up the stored token for a user, refreshing it if the store
    /// supports refresh.
    async fn user_token(&self, user_id: &str) -> Result<AccessToken, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header_value() {
        let token = AccessToken::new("tok-123", 3600);
        assert_eq!(token.bearer(), "Bearer tok-123");
    }
}
