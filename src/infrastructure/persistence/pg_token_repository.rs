//! PostgreSQL implementation of token repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;

const TOKEN_COLUMNS: &str = "id, name, token_hash, created_at, last_used_at, revoked_at";

/// PostgreSQL repository for API token storage and validation.
///
/// Stores keyed hashes of tokens. Raw tokens are never persisted.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        let token = sqlx::query_as::<_, ApiToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE token_hash = $1 AND revoked_at IS NULL"
        ))
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(token)
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE api_tokens
            SET last_used_at = NOW()
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_token(&self, name: &str, token_hash: &str) -> Result<ApiToken, AppError> {
        let token = sqlx::query_as::<_, ApiToken>(&format!(
            "INSERT INTO api_tokens (name, token_hash) VALUES ($1, $2) RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(name)
        .bind(token_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let tokens = sqlx::query_as::<_, ApiToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(tokens)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let token = sqlx::query_as::<_, ApiToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(token)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let token = sqlx::query_as::<_, ApiToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(token)
    }

    async fn revoke_token(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE api_tokens
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
