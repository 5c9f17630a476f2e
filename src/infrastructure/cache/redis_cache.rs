//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, UrlCache};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

/// Redis cache for URL records.
///
/// Records are stored as JSON under `url:original:<url>` and
/// `url:short_id:<id>` with a fixed expiration. Uses `ConnectionManager` for
/// connection reuse; the manager reconnects transparently after failures.
///
/// Errors are returned to the caller, which decides how to degrade.
pub struct RedisCache {
    client: ConnectionManager,
    ttl_seconds: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `ttl_seconds` - expiration applied to every cached entry
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            ttl_seconds,
            key_prefix: "url:".to_string(),
        })
    }

    fn original_key(&self, original_url: &str) -> String {
        format!("{}original:{}", self.key_prefix, original_url)
    }

    fn short_id_key(&self, short_id: &str) -> String {
        format!("{}short_id:{}", self.key_prefix, short_id)
    }

    async fn get_json(&self, key: &str) -> CacheResult<Option<UrlRecord>> {
        let mut conn = self.client.clone();

        let raw = conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {}: {}", key, e)))?;

        match raw {
            Some(payload) => {
                debug!(key, "Cache HIT");
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => {
                debug!(key, "Cache MISS");
                Ok(None)
            }
        }
    }

    async fn set_json(&self, key: &str, record: &UrlRecord) -> CacheResult<()> {
        let payload = serde_json::to_string(record)?;
        let mut conn = self.client.clone();

        conn.set_ex::<_, _, ()>(key, payload, self.ttl_seconds)
            .await
            .map_err(|e| CacheError::OperationError(format!("SET {}: {}", key, e)))?;

        debug!(key, ttl = self.ttl_seconds, "Cache SET");
        Ok(())
    }
}

#[async_trait]
impl UrlCache for RedisCache {
    async fn get_by_original(&self, original_url: &str) -> CacheResult<Option<UrlRecord>> {
        self.get_json(&self.original_key(original_url)).await
    }

    async fn set_by_original(&self, record: &UrlRecord) -> CacheResult<()> {
        self.set_json(&self.original_key(&record.original_url), record)
            .await
    }

    async fn get_by_short_id(&self, short_id: &str) -> CacheResult<Option<UrlRecord>> {
        self.get_json(&self.short_id_key(short_id)).await
    }

    async fn set_by_short_id(&self, record: &UrlRecord) -> CacheResult<()> {
        self.set_json(&self.short_id_key(&record.short_id), record)
            .await
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
