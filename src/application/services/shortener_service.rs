//! Cache-aside shortening and resolution service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::{Instant, error::Elapsed, timeout_at};
use tracing::{debug, info, warn};

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheResult, UrlCache};
use crate::utils::short_id::ShortIdGenerator;

/// Tunables for [`ShortenerService`].
#[derive(Debug, Clone, Copy)]
pub struct ShortenerSettings {
    /// Budget for one whole operation when the caller supplies no deadline.
    pub store_timeout: Duration,
    /// How many fresh short IDs to try before giving up on collisions.
    pub max_attempts: usize,
    /// Budget for a single cache call, capped by the operation deadline.
    pub cache_timeout: Duration,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(2),
            max_attempts: 5,
            cache_timeout: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CacheKey {
    Original,
    ShortId,
}

impl CacheKey {
    fn as_str(self) -> &'static str {
        match self {
            CacheKey::Original => "original",
            CacheKey::ShortId => "short_id",
        }
    }
}

/// Coordinates the cache and the durable repository.
///
/// Reads go to the cache first and fall back to the repository; every
/// repository hit or insert is written back under both cache keys. The
/// repository is authoritative: its failures fail the operation, while cache
/// failures of any kind are logged, counted and treated as misses.
///
/// The service holds no mutable state and is shared across requests.
pub struct ShortenerService {
    repository: Arc<dyn UrlRepository>,
    cache: Arc<dyn UrlCache>,
    generator: Arc<dyn ShortIdGenerator>,
    settings: ShortenerSettings,
}

impl ShortenerService {
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn UrlCache>,
        generator: Arc<dyn ShortIdGenerator>,
        settings: ShortenerSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            generator,
            settings,
        }
    }

    pub fn repository(&self) -> &Arc<dyn UrlRepository> {
        &self.repository
    }

    pub fn cache(&self) -> &Arc<dyn UrlCache> {
        &self.cache
    }

    fn default_deadline(&self) -> Instant {
        Instant::now() + self.settings.store_timeout
    }

    /// A cache call may not consume the repository's share of `deadline`.
    fn cache_deadline(&self, deadline: Instant) -> Instant {
        (Instant::now() + self.settings.cache_timeout).min(deadline)
    }

    /// Returns the record for `original_url`, creating it if none exists.
    ///
    /// Uses the configured store timeout as the deadline.
    ///
    /// # Errors
    ///
    /// See [`Self::shorten_until`].
    pub async fn shorten(&self, original_url: &str) -> Result<UrlRecord, AppError> {
        self.shorten_until(original_url, self.default_deadline())
            .await
    }

    /// Returns the record for `original_url`, creating it if none exists.
    ///
    /// # Flow
    ///
    /// 1. Cache lookup by original URL; a hit returns immediately
    /// 2. Repository lookup by original URL; a hit is backfilled and returned
    /// 3. Otherwise a new short ID is generated and persisted, then backfilled
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty URL.
    ///
    /// Returns [`AppError::Storage`] if a repository call fails or does not
    /// finish before `deadline`. The cache is never written for a record that
    /// was not persisted.
    ///
    /// Returns [`AppError::Internal`] if every generated short ID collided.
    pub async fn shorten_until(
        &self,
        original_url: &str,
        deadline: Instant,
    ) -> Result<UrlRecord, AppError> {
        if original_url.is_empty() {
            return Err(AppError::bad_request("URL must not be empty", json!({})));
        }

        let cached = self
            .cache_lookup(
                CacheKey::Original,
                self.cache.get_by_original(original_url),
                deadline,
            )
            .await;
        if let Some(record) = cached {
            return Ok(record);
        }

        let existing = self
            .bounded(
                "find_by_original",
                self.repository.find_by_original(original_url),
                deadline,
            )
            .await?;
        if let Some(record) = existing {
            debug!(short_id = %record.short_id, "Repository hit by original");
            self.backfill(&record, deadline).await;
            return Ok(record);
        }

        let record = self.persist_new(original_url, deadline).await?;
        self.backfill(&record, deadline).await;

        Ok(record)
    }

    /// Resolves a short ID, returning `Ok(None)` when neither tier knows it.
    ///
    /// # Errors
    ///
    /// See [`Self::find_by_short_id_until`].
    pub async fn find_by_short_id(&self, short_id: &str) -> Result<Option<UrlRecord>, AppError> {
        self.find_by_short_id_until(short_id, self.default_deadline())
            .await
    }

    /// Resolves a short ID with the same cache-aside policy as [`Self::shorten_until`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the repository call fails or does not
    /// finish before `deadline`.
    pub async fn find_by_short_id_until(
        &self,
        short_id: &str,
        deadline: Instant,
    ) -> Result<Option<UrlRecord>, AppError> {
        let cached = self
            .cache_lookup(
                CacheKey::ShortId,
                self.cache.get_by_short_id(short_id),
                deadline,
            )
            .await;
        if let Some(record) = cached {
            return Ok(Some(record));
        }

        let found = self
            .bounded(
                "find_by_short_id",
                self.repository.find_by_short_id(short_id),
                deadline,
            )
            .await?;

        if let Some(record) = &found {
            self.backfill(record, deadline).await;
        }

        Ok(found)
    }

    /// Generates a short ID and saves a new record, regenerating on collision.
    ///
    /// A concurrent writer may have stored the same URL first; the repository
    /// then returns that row, which carries a short ID other than ours.
    async fn persist_new(&self, original_url: &str, deadline: Instant) -> Result<UrlRecord, AppError> {
        for attempt in 1..=self.settings.max_attempts {
            let new_record = NewUrlRecord {
                short_id: self.generator.next_id(),
                original_url: original_url.to_string(),
            };
            let short_id = new_record.short_id.clone();

            match self
                .bounded("save", self.repository.save(new_record), deadline)
                .await
            {
                Ok(record) if record.short_id == short_id => {
                    info!(%short_id, "Short URL created");
                    return Ok(record);
                }
                Ok(record) => {
                    info!(
                        short_id = %record.short_id,
                        discarded = %short_id,
                        "URL was shortened concurrently, reusing stored record"
                    );
                    return Ok(record);
                }
                Err(AppError::Conflict { .. }) => {
                    warn!(%short_id, attempt, "Short ID collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique short ID",
            json!({ "reason": "Too many collisions", "attempts": self.settings.max_attempts }),
        ))
    }

    /// Runs a repository call against the deadline.
    async fn bounded<T, F>(
        &self,
        operation: &'static str,
        call: F,
        deadline: Instant,
    ) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match timeout_at(deadline, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, "Repository call exceeded deadline");
                Err(AppError::storage(
                    "Storage timeout",
                    json!({ "operation": operation }),
                ))
            }
        }
    }

    /// Runs a cache lookup; errors and timeouts count as misses.
    async fn cache_lookup<F>(&self, key: CacheKey, lookup: F, deadline: Instant) -> Option<UrlRecord>
    where
        F: Future<Output = CacheResult<Option<UrlRecord>>>,
    {
        let (result, record) = match timeout_at(self.cache_deadline(deadline), lookup).await {
            Ok(Ok(Some(record))) => ("hit", Some(record)),
            Ok(Ok(None)) => ("miss", None),
            Ok(Err(e)) => {
                warn!(key = key.as_str(), error = %e, "Cache lookup failed, using repository");
                ("error", None)
            }
            Err(_) => {
                warn!(key = key.as_str(), "Cache lookup timed out, using repository");
                ("error", None)
            }
        };

        debug!(key = key.as_str(), result, "Cache lookup");
        metrics::counter!(
            "linkcache_cache_lookups_total",
            "key" => key.as_str(),
            "result" => result
        )
        .increment(1);

        record
    }

    /// Writes `record` under both cache keys. Never fails the caller.
    async fn backfill(&self, record: &UrlRecord, deadline: Instant) {
        let by_original = timeout_at(
            self.cache_deadline(deadline),
            self.cache.set_by_original(record),
        )
        .await;
        note_cache_write(CacheKey::Original, &record.short_id, by_original);

        let by_short_id = timeout_at(
            self.cache_deadline(deadline),
            self.cache.set_by_short_id(record),
        )
        .await;
        note_cache_write(CacheKey::ShortId, &record.short_id, by_short_id);
    }
}

fn note_cache_write(key: CacheKey, short_id: &str, outcome: Result<CacheResult<()>, Elapsed>) {
    let reason = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e.to_string(),
        Err(_) => "timed out".to_string(),
    };

    warn!(key = key.as_str(), short_id, %reason, "Cache backfill failed");
    metrics::counter!("linkcache_cache_write_failures_total", "key" => key.as_str()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::cache::{CacheError, MockUrlCache};
    use crate::utils::short_id::MockShortIdGenerator;
    use async_trait::async_trait;
    use chrono::Utc;

    fn record(id: i64, short_id: &str, url: &str) -> UrlRecord {
        UrlRecord::new(id, short_id, url, Utc::now())
    }

    fn fixed_generator(id: &'static str) -> MockShortIdGenerator {
        let mut generator = MockShortIdGenerator::new();
        generator.expect_next_id().returning(move || id.to_string());
        generator
    }

    fn service(
        repo: MockUrlRepository,
        cache: MockUrlCache,
        generator: MockShortIdGenerator,
    ) -> ShortenerService {
        ShortenerService::new(
            Arc::new(repo),
            Arc::new(cache),
            Arc::new(generator),
            ShortenerSettings::default(),
        )
    }

    fn accepting_writes(cache: &mut MockUrlCache) {
        cache.expect_set_by_original().times(1).returning(|_| Ok(()));
        cache.expect_set_by_short_id().times(1).returning(|_| Ok(()));
    }

    #[tokio::test]
    async fn test_shorten_cache_hit_skips_repository() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        let cached = record(3, "abc123", "https://example.com");
        cache
            .expect_get_by_original()
            .withf(|url| url == "https://example.com")
            .times(1)
            .returning(move |_| Ok(Some(cached.clone())));
        cache.expect_set_by_original().times(0);
        cache.expect_set_by_short_id().times(0);
        repo.expect_find_by_original().times(0);
        repo.expect_save().times(0);

        let svc = service(repo, cache, MockShortIdGenerator::new());
        let result = svc.shorten("https://example.com").await.unwrap();

        assert_eq!(result.short_id, "abc123");
    }

    #[tokio::test]
    async fn test_shorten_repository_hit_backfills_both_keys() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        cache.expect_get_by_original().returning(|_| Ok(None));
        let existing = record(5, "exist1", "https://example.com");
        repo.expect_find_by_original()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_save().times(0);
        cache
            .expect_set_by_original()
            .withf(|r| r.original_url == "https://example.com")
            .times(1)
            .returning(|_| Ok(()));
        cache
            .expect_set_by_short_id()
            .withf(|r| r.short_id == "exist1")
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(repo, cache, MockShortIdGenerator::new());
        let result = svc.shorten("https://example.com").await.unwrap();

        assert_eq!(result.id, 5);
        assert_eq!(result.short_id, "exist1");
    }

    #[tokio::test]
    async fn test_shorten_creates_new_record() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        cache.expect_get_by_original().returning(|_| Ok(None));
        repo.expect_find_by_original().returning(|_| Ok(None));
        repo.expect_save()
            .withf(|new| new.short_id == "new123" && new.original_url == "https://example.com")
            .times(1)
            .returning(|new| Ok(record(10, &new.short_id, &new.original_url)));
        accepting_writes(&mut cache);

        let svc = service(repo, cache, fixed_generator("new123"));
        let result = svc.shorten("https://example.com").await.unwrap();

        assert_eq!(result.short_id, "new123");
        assert_eq!(result.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_shorten_lookup_failure_aborts_without_side_effects() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        cache.expect_get_by_original().returning(|_| Ok(None));
        repo.expect_find_by_original()
            .returning(|_| Err(AppError::storage("Database error", json!({}))));
        repo.expect_save().times(0);
        cache.expect_set_by_original().times(0);
        cache.expect_set_by_short_id().times(0);

        let svc = service(repo, cache, MockShortIdGenerator::new());
        let err = svc.shorten("https://example.com").await.unwrap_err();

        assert!(matches!(err, AppError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_shorten_save_failure_leaves_cache_untouched() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        cache.expect_get_by_original().returning(|_| Ok(None));
        repo.expect_find_by_original().returning(|_| Ok(None));
        repo.expect_save()
            .times(1)
            .returning(|_| Err(AppError::storage("Database error", json!({}))));
        cache.expect_set_by_original().times(0);
        cache.expect_set_by_short_id().times(0);

        let svc = service(repo, cache, fixed_generator("new123"));
        let err = svc.shorten("https://example.com").await.unwrap_err();

        assert!(matches!(err, AppError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_shorten_cache_errors_are_absorbed() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        cache
            .expect_get_by_original()
            .returning(|_| Err(CacheError::ConnectionError("refused".into())));
        repo.expect_find_by_original().returning(|_| Ok(None));
        repo.expect_save()
            .returning(|new| Ok(record(1, &new.short_id, &new.original_url)));
        cache
            .expect_set_by_original()
            .times(1)
            .returning(|_| Err(CacheError::OperationError("READONLY".into())));
        cache
            .expect_set_by_short_id()
            .times(1)
            .returning(|_| Err(CacheError::OperationError("READONLY".into())));

        let svc = service(repo, cache, fixed_generator("new123"));
        let result = svc.shorten("https://example.com").await.unwrap();

        assert_eq!(result.short_id, "new123");
    }

    #[tokio::test]
    async fn test_shorten_regenerates_on_collision() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();
        let mut generator = MockShortIdGenerator::new();

        let mut issued = 0;
        generator.expect_next_id().times(2).returning(move || {
            issued += 1;
            format!("id{issued:04}")
        });
        cache.expect_get_by_original().returning(|_| Ok(None));
        repo.expect_find_by_original().returning(|_| Ok(None));
        repo.expect_save()
            .withf(|new| new.short_id == "id0001")
            .times(1)
            .returning(|_| {
                Err(AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": "urls_short_id_key" }),
                ))
            });
        repo.expect_save()
            .withf(|new| new.short_id == "id0002")
            .times(1)
            .returning(|new| Ok(record(2, &new.short_id, &new.original_url)));
        accepting_writes(&mut cache);

        let svc = service(repo, cache, generator);
        let result = svc.shorten("https://example.com").await.unwrap();

        assert_eq!(result.short_id, "id0002");
    }

    #[tokio::test]
    async fn test_shorten_gives_up_after_max_attempts() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        cache.expect_get_by_original().returning(|_| Ok(None));
        repo.expect_find_by_original().returning(|_| Ok(None));
        repo.expect_save()
            .times(ShortenerSettings::default().max_attempts)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));
        cache.expect_set_by_original().times(0);
        cache.expect_set_by_short_id().times(0);

        let svc = service(repo, cache, fixed_generator("same01"));
        let err = svc.shorten("https://example.com").await.unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_shorten_rejects_empty_url() {
        let svc = service(
            MockUrlRepository::new(),
            MockUrlCache::new(),
            MockShortIdGenerator::new(),
        );

        let err = svc.shorten("").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_find_cache_hit_skips_repository() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        let cached = record(9, "abc123", "https://x.com");
        cache
            .expect_get_by_short_id()
            .withf(|id| id == "abc123")
            .returning(move |_| Ok(Some(cached.clone())));
        repo.expect_find_by_short_id().times(0);

        let svc = service(repo, cache, MockShortIdGenerator::new());
        let result = svc.find_by_short_id("abc123").await.unwrap().unwrap();

        assert_eq!(result.original_url, "https://x.com");
    }

    #[tokio::test]
    async fn test_find_repository_hit_backfills_both_keys() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        cache.expect_get_by_short_id().returning(|_| Ok(None));
        let stored = record(4, "abc123", "https://x.com");
        repo.expect_find_by_short_id()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));
        accepting_writes(&mut cache);

        let svc = service(repo, cache, MockShortIdGenerator::new());
        let result = svc.find_by_short_id("abc123").await.unwrap();

        assert_eq!(result.unwrap().id, 4);
    }

    #[tokio::test]
    async fn test_find_not_found_in_either_tier() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        cache.expect_get_by_short_id().returning(|_| Ok(None));
        repo.expect_find_by_short_id().returning(|_| Ok(None));
        cache.expect_set_by_original().times(0);
        cache.expect_set_by_short_id().times(0);

        let svc = service(repo, cache, MockShortIdGenerator::new());
        let result = svc.find_by_short_id("doesnotexist").await.unwrap();

        assert!(result.is_none());
    }

    struct StalledRepository;

    #[async_trait]
    impl UrlRepository for StalledRepository {
        async fn save(&self, _new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            unreachable!("deadline should fire first")
        }

        async fn find_by_original(&self, _original_url: &str) -> Result<Option<UrlRecord>, AppError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn find_by_short_id(&self, _short_id: &str) -> Result<Option<UrlRecord>, AppError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn ping(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_deadline_surfaces_as_storage_error() {
        let mut cache = MockUrlCache::new();
        cache.expect_get_by_short_id().returning(|_| Ok(None));
        cache.expect_set_by_original().times(0);
        cache.expect_set_by_short_id().times(0);

        let svc = ShortenerService::new(
            Arc::new(StalledRepository),
            Arc::new(cache),
            Arc::new(MockShortIdGenerator::new()),
            ShortenerSettings::default(),
        );

        let deadline = Instant::now() + Duration::from_millis(50);
        let err = svc
            .find_by_short_id_until("abc123", deadline)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage { .. }));
    }

    struct StalledCache;

    #[async_trait]
    impl UrlCache for StalledCache {
        async fn get_by_original(&self, _original_url: &str) -> CacheResult<Option<UrlRecord>> {
            std::future::pending().await
        }

        async fn set_by_original(&self, _record: &UrlRecord) -> CacheResult<()> {
            std::future::pending().await
        }

        async fn get_by_short_id(&self, _short_id: &str) -> CacheResult<Option<UrlRecord>> {
            std::future::pending().await
        }

        async fn set_by_short_id(&self, _record: &UrlRecord) -> CacheResult<()> {
            std::future::pending().await
        }

        async fn health_check(&self) -> bool {
            false
        }

        fn backend(&self) -> &'static str {
            "stalled"
        }
    }

    /// Awaits a short round trip before answering, like a networked store.
    struct RoundTripRepository {
        stored: UrlRecord,
    }

    impl RoundTripRepository {
        async fn round_trip(&self) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[async_trait]
    impl UrlRepository for RoundTripRepository {
        async fn save(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
            self.round_trip().await;
            Ok(record(2, &new_record.short_id, &new_record.original_url))
        }

        async fn find_by_original(&self, original_url: &str) -> Result<Option<UrlRecord>, AppError> {
            self.round_trip().await;
            Ok((self.stored.original_url == original_url).then(|| self.stored.clone()))
        }

        async fn find_by_short_id(&self, short_id: &str) -> Result<Option<UrlRecord>, AppError> {
            self.round_trip().await;
            Ok((self.stored.short_id == short_id).then(|| self.stored.clone()))
        }

        async fn ping(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn stalled_cache_service(generator: MockShortIdGenerator) -> ShortenerService {
        ShortenerService::new(
            Arc::new(RoundTripRepository {
                stored: record(1, "abc123", "https://x.com"),
            }),
            Arc::new(StalledCache),
            Arc::new(generator),
            ShortenerSettings {
                store_timeout: Duration::from_millis(200),
                cache_timeout: Duration::from_millis(20),
                ..ShortenerSettings::default()
            },
        )
    }

    #[tokio::test]
    async fn test_stalled_cache_leaves_budget_for_repository_on_find() {
        let svc = stalled_cache_service(MockShortIdGenerator::new());

        let found = svc.find_by_short_id("abc123").await.unwrap().unwrap();

        assert_eq!(found.original_url, "https://x.com");
    }

    #[tokio::test]
    async fn test_stalled_cache_leaves_budget_for_repository_on_shorten() {
        let svc = stalled_cache_service(fixed_generator("new123"));

        let existing = svc.shorten("https://x.com").await.unwrap();
        assert_eq!(existing.short_id, "abc123");

        let created = svc.shorten("https://y.com").await.unwrap();
        assert_eq!(created.short_id, "new123");
    }

    #[tokio::test]
    async fn test_concurrent_winner_is_returned_as_is() {
        let mut repo = MockUrlRepository::new();
        let mut cache = MockUrlCache::new();

        cache.expect_get_by_original().returning(|_| Ok(None));
        repo.expect_find_by_original().returning(|_| Ok(None));
        repo.expect_save()
            .times(1)
            .returning(|new| Ok(record(8, "winner", &new.original_url)));
        accepting_writes(&mut cache);

        let svc = service(repo, cache, fixed_generator("loser1"));
        let result = svc.shorten("https://example.com").await.unwrap();

        assert_eq!(result.short_id, "winner");
    }
}
