//! Response DTO for URL records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::UrlRecord;

/// A URL record as returned by `POST /api/shorten` and `GET /api/urls/{short_id}`.
#[derive(Debug, Serialize)]
pub struct UrlRecordResponse {
    pub short_id: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl UrlRecordResponse {
    pub fn new(record: UrlRecord, short_url: String) -> Self {
        Self {
            short_id: record.short_id,
            short_url,
            original_url: record.original_url,
            created_at: record.created_at,
        }
    }
}
