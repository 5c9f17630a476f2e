//! In-memory implementation of the URL repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Process-local URL repository backed by two `DashMap` indexes.
///
/// Mirrors the PostgreSQL semantics: `original_url` and `short_id` are both
/// unique, and saving an already-known original returns the stored record.
/// Lock order is always `by_original` then `by_short_id`.
#[derive(Debug, Default)]
pub struct InMemoryUrlRepository {
    by_short_id: DashMap<String, UrlRecord>,
    by_original: DashMap<String, String>,
    next_id: AtomicI64,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.by_short_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_short_id.is_empty()
    }

    fn lookup(&self, short_id: &str) -> Option<UrlRecord> {
        self.by_short_id.get(short_id).map(|r| r.clone())
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn save(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let original_slot = match self.by_original.entry(new_record.original_url.clone()) {
            Entry::Occupied(existing) => {
                let short_id = existing.get().clone();
                drop(existing);
                return self.lookup(&short_id).ok_or_else(|| {
                    AppError::internal("Index out of sync", json!({ "short_id": short_id }))
                });
            }
            Entry::Vacant(slot) => slot,
        };

        let short_id_slot = match self.by_short_id.entry(new_record.short_id.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": "urls_short_id_key" }),
                ));
            }
            Entry::Vacant(slot) => slot,
        };

        let record = UrlRecord::new(
            self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            new_record.short_id.clone(),
            new_record.original_url,
            Utc::now(),
        );

        short_id_slot.insert(record.clone());
        original_slot.insert(new_record.short_id);

        Ok(record)
    }

    async fn find_by_original(&self, original_url: &str) -> Result<Option<UrlRecord>, AppError> {
        let Some(short_id) = self.by_original.get(original_url).map(|s| s.clone()) else {
            return Ok(None);
        };

        Ok(self.lookup(&short_id))
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<UrlRecord>, AppError> {
        Ok(self.lookup(short_id))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
