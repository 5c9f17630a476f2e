//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// PostgreSQL repository for URL records.
///
/// `urls.short_id` is UNIQUE and `urls.original_url` is unique through an
/// index on its md5 digest, which keeps arbitrarily long URLs indexable.
/// Inserts are upserts on that digest, so two concurrent first-time
/// shortenings of the same URL converge on a single row.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn save(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            INSERT INTO urls (short_id, original_url)
            VALUES ($1, $2)
            ON CONFLICT ((md5(original_url)))
                DO UPDATE SET short_id = urls.short_id
            RETURNING id, short_id, original_url, created_at
            "#,
        )
        .bind(&new_record.short_id)
        .bind(&new_record.original_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        // Distinct URLs sharing a digest must not be merged.
        if record.original_url != new_record.original_url {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "urls_original_url_md5_key" }),
            ));
        }

        Ok(record)
    }

    async fn find_by_original(&self, original_url: &str) -> Result<Option<UrlRecord>, AppError> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, short_id, original_url, created_at
            FROM urls
            WHERE md5(original_url) = md5($1) AND original_url = $1
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<UrlRecord>, AppError> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, short_id, original_url, created_at
            FROM urls
            WHERE short_id = $1
            "#,
        )
        .bind(short_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
