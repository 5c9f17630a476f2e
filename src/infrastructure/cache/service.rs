//! Cache trait and error types.

use async_trait::async_trait;

use crate::domain::entities::UrlRecord;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
    #[error("Cache payload error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Time-bounded accelerator mirroring the durable repository.
///
/// Every record is cached under two independent keys: its original URL and
/// its short ID. Writes overwrite (last write wins) and expire after the
/// implementation's TTL. Implementations only store; they hold no business
/// logic and must be safe for concurrent use.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::InMemoryCache`] - process-local Moka cache
/// - [`crate::infrastructure::cache::NullCache`] - cache absent, always misses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlCache: Send + Sync {
    /// Looks up a record by its original URL. `Ok(None)` is a miss.
    async fn get_by_original(&self, original_url: &str) -> CacheResult<Option<UrlRecord>>;

    /// Caches a record under its original URL.
    async fn set_by_original(&self, record: &UrlRecord) -> CacheResult<()>;

    /// Looks up a record by its short ID. `Ok(None)` is a miss.
    async fn get_by_short_id(&self, short_id: &str) -> CacheResult<Option<UrlRecord>>;

    /// Caches a record under its short ID.
    async fn set_by_short_id(&self, record: &UrlRecord) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
