//! URL record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened URL mapping.
///
/// `id` is assigned by the durable repository and is opaque outside of it.
/// `short_id` is never reassigned once persisted, and `created_at` is set at
/// first persistence. The same shape is used as the cache payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UrlRecord {
    pub id: i64,
    pub short_id: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(
        id: i64,
        short_id: impl Into<String>,
        original_url: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            short_id: short_id.into(),
            original_url: original_url.into(),
            created_at,
        }
    }
}

/// Input data for persisting a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub short_id: String,
    pub original_url: String,
}
