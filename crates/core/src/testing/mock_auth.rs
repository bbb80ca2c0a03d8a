//! Mock authentication collaborators.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::{AccessToken, AuthError, ServiceAuth, UserTokenStore};

/// Mock implementation of the ServiceAuth trait.
pub struct MockServiceAuth {
    token: Arc<RwLock<AccessToken>>,
    authenticate_count: Arc<RwLock<usize>>,
    next_error: Arc<RwLock<Option<AuthError>>>,
}

impl Default for MockServiceAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServiceAuth {
    /// Create a mock that hands out a fixed service token.
    pub fn new() -> Self {
        Self {
            token: Arc::new(RwLock::new(AccessToken::new("service-token", 3599))),
            authenticate_count: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the token handed out by subsequent calls.
    pub async fn set_token(&self, token: AccessToken) {
        *self.token.write().await = token;
    }

    /// Number of authenticate calls received.
    pub async fn authenticate_count(&self) -> usize {
        *self.authenticate_count.read().await
    }

    /// Configure the next authenticate call to fail.
    pub async fn set_next_error(&self, error: AuthError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl ServiceAuth for MockServiceAuth {
    async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        *self.authenticate_count.write().await += 1;
        Ok(self.token.read().await.clone())
    }
}

/// Mock implementation of the UserTokenStore trait.
pub struct MockUserTokenStore {
    tokens: Arc<RwLock<HashMap<String, AccessToken>>>,
    lookups: Arc<RwLock<Vec<String>>>,
}

impl Default for MockUserTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUserTokenStore {
    /// Create an empty store; unknown users fail with CredentialsNotFound.
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            lookups: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Store a token for a user.
    pub async fn insert(&self, user_id: &str, token: AccessToken) {
        self.tokens.write().await.insert(user_id.to_string(), token);
    }

    /// User ids that were looked up, in order.
    pub async fn recorded_lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }
}

#[async_trait]
impl UserTokenStore for MockUserTokenStore {
    async fn user_token(&self, user_id: &str) -> Result<AccessToken, AuthError> {
        self.lookups.write().await.push(user_id.to_string());
        self.tokens
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| AuthError::CredentialsNotFound(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_service_auth_counts_calls() {
        let auth = MockServiceAuth::new();
        auth.authenticate().await.unwrap();
        auth.authenticate().await.unwrap();
        assert_eq!(auth.authenticate_count().await, 2);
    }

    #[tokio::test]
    async fn test_service_auth_error_injection_is_one_shot() {
        let auth = MockServiceAuth::new();
        auth.set_next_error(AuthError::Rejected("nope".to_string()))
            .await;
        assert!(auth.authenticate().await.is_err());
        assert!(auth.authenticate().await.is_ok());
    }

    #[tokio::test]
    async fn test_user_token_store_unknown_user() {
        let store = MockUserTokenStore::new();
        let err = store.user_token("ghost").await.unwrap_err();
        assert!(matches!(err, AuthError::CredentialsNotFound(_)));
    }

    #[tokio::test]
    async fn test_user_token_store_lookup() {
        let store = MockUserTokenStore::new();
        store.insert("u1", AccessToken::new("tok-u1", 3600)).await;
        let token = store.user_token("u1").await.unwrap();
        assert_eq!(token.token, "tok-u1");
        assert_eq!(store.recorded_lookups().await, vec!["u1".to_string()]);
    }
}
