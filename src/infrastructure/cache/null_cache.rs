//! No-op cache used when caching is disabled.

use super::service::{CacheResult, UrlCache};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that stores nothing.
///
/// Every lookup is a miss and every write succeeds without effect, so the
/// orchestrator always falls through to the durable repository.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for NullCache {
    async fn get_by_original(&self, _original_url: &str) -> CacheResult<Option<UrlRecord>> {
        Ok(None)
    }

    async fn set_by_original(&self, _record: &UrlRecord) -> CacheResult<()> {
        Ok(())
    }

    async fn get_by_short_id(&self, _short_id: &str) -> CacheResult<Option<UrlRecord>> {
        Ok(None)
    }

    async fn set_by_short_id(&self, _record: &UrlRecord) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "none"
    }
}
