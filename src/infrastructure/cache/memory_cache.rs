//! Process-local cache backed by Moka.

use super::service::{CacheResult, UrlCache};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::trace;

/// In-memory cache for single-node deployments and tests.
///
/// Both key spaces share one bounded Moka cache; keys are namespaced the same
/// way as in [`crate::infrastructure::cache::RedisCache`]. Entries expire after
/// the configured TTL from insertion.
#[derive(Debug, Clone)]
pub struct InMemoryCache {
    cache: Cache<String, UrlRecord>,
}

impl InMemoryCache {
    /// Creates a cache holding at most `max_capacity` entries, each living for `ttl`.
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::with_ttl(10_000, Duration::from_secs(3600))
    }
}

fn original_key(original_url: &str) -> String {
    format!("url:original:{original_url}")
}

fn short_id_key(short_id: &str) -> String {
    format!("url:short_id:{short_id}")
}

#[async_trait]
impl UrlCache for InMemoryCache {
    async fn get_by_original(&self, original_url: &str) -> CacheResult<Option<UrlRecord>> {
        let hit = self.cache.get(&original_key(original_url)).await;
        trace!(hit = hit.is_some(), "Moka lookup by original");
        Ok(hit)
    }

    async fn set_by_original(&self, record: &UrlRecord) -> CacheResult<()> {
        self.cache
            .insert(original_key(&record.original_url), record.clone())
            .await;
        Ok(())
    }

    async fn get_by_short_id(&self, short_id: &str) -> CacheResult<Option<UrlRecord>> {
        let hit = self.cache.get(&short_id_key(short_id)).await;
        trace!(short_id, hit = hit.is_some(), "Moka lookup by short id");
        Ok(hit)
    }

    async fn set_by_short_id(&self, record: &UrlRecord) -> CacheResult<()> {
        self.cache
            .insert(short_id_key(&record.short_id), record.clone())
            .await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
