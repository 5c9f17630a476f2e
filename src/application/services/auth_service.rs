//! Authentication service for API token validation.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub token_id: i64,
    pub name: String,
}

/// Validates raw bearer tokens.
///
/// The HTTP layer only depends on this trait, so tests can swap in a static
/// validator without a token store.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    async fn validate(&self, token: &str) -> Result<TokenClaims, AppError>;
}

/// Hashes a raw token with HMAC-SHA256 keyed by `secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the key is rejected by the MAC.
pub fn hash_token(secret: &str, token: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| {
        AppError::internal("Invalid signing secret", json!({ "reason": e.to_string() }))
    })?;
    mac.update(token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Service for authenticating API requests via Bearer tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService<R: TokenRepository> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when tokens were created.
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw token against stored credentials.
    ///
    /// On success the `last_used_at` timestamp is refreshed; a failure to do
    /// so is logged and does not reject the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the hash matches no active token.
    ///
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<TokenClaims, AppError> {
        let token_hash = hash_token(&self.signing_secret, token)?;

        let Some(api_token) = self.repository.find_active(&token_hash).await? else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        };

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            tracing::warn!(token_id = api_token.id, error = %e, "Failed to update token usage");
        }

        Ok(TokenClaims {
            token_id: api_token.id,
            name: api_token.name,
        })
    }
}

#[async_trait]
impl<R: TokenRepository> TokenValidator for AuthService<R> {
    async fn validate(&self, token: &str) -> Result<TokenClaims, AppError> {
        self.authenticate(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{ApiToken, MockTokenRepository};
    use chrono::Utc;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn api_token(id: i64, name: &str, hash: &str) -> ApiToken {
        ApiToken {
            id,
            name: name.to_string(),
            token_hash: hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockTokenRepository::new();

        let token = "valid-token";
        let expected_hash = hash_token(&test_secret(), token).unwrap();
        let stored = api_token(7, "ci", &expected_hash);

        mock_repo
            .expect_find_active()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        mock_repo
            .expect_update_last_used()
            .times(1)
            .returning(|_| Ok(()));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let claims = service.authenticate(token).await.unwrap();

        assert_eq!(claims.token_id, 7);
        assert_eq!(claims.name, "ci");
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_active()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo.expect_update_last_used().times(0);

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate("invalid-token").await;

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_usage_update_failure_does_not_reject() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_active()
            .returning(|hash| Ok(Some(api_token(1, "ops", hash))));
        mock_repo
            .expect_update_last_used()
            .returning(|_| Err(AppError::storage("Database error", json!({}))));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        assert!(service.validate("some-token").await.is_ok());
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_active()
            .returning(|_| Err(AppError::storage("Database error", json!({}))));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate("token").await;
        assert!(matches!(result.unwrap_err(), AppError::Storage { .. }));
    }

    #[test]
    fn test_hash_token_consistency() {
        let hash1 = hash_token(&test_secret(), "test-token").unwrap();
        let hash2 = hash_token(&test_secret(), "test-token").unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_token_different_inputs() {
        let hash1 = hash_token(&test_secret(), "token1").unwrap();
        let hash2 = hash_token(&test_secret(), "token2").unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_token_secret_matters() {
        assert_ne!(
            hash_token("secret-a", "token").unwrap(),
            hash_token("secret-b", "token").unwrap()
        );
    }
}
