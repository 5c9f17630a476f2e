#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use linkcache::AppError;
use linkcache::application::services::{
    ShortenerService, ShortenerSettings, TokenClaims, TokenValidator,
};
use linkcache::domain::entities::UrlRecord;
use linkcache::infrastructure::cache::{CacheError, CacheResult, InMemoryCache, UrlCache};
use linkcache::infrastructure::persistence::InMemoryUrlRepository;
use linkcache::state::AppState;
use linkcache::utils::short_id::TimeSortableGenerator;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_TOKEN: &str = "test-token";
pub const BASE_URL: &str = "https://lnk.test";

/// Accepts exactly one token.
pub struct StaticTokenValidator {
    token: String,
}

impl StaticTokenValidator {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Result<TokenClaims, AppError> {
        if token == self.token {
            Ok(TokenClaims {
                token_id: 1,
                name: "test".to_string(),
            })
        } else {
            Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ))
        }
    }
}

/// A cache whose backend is unreachable.
pub struct UnreachableCache;

#[async_trait]
impl UrlCache for UnreachableCache {
    async fn get_by_original(&self, _original_url: &str) -> CacheResult<Option<UrlRecord>> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn set_by_original(&self, _record: &UrlRecord) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn get_by_short_id(&self, _short_id: &str) -> CacheResult<Option<UrlRecord>> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn set_by_short_id(&self, _record: &UrlRecord) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

pub struct TestContext {
    pub state: AppState,
    pub repository: Arc<InMemoryUrlRepository>,
    pub cache: Arc<InMemoryCache>,
}

pub fn create_shortener(
    repository: Arc<InMemoryUrlRepository>,
    cache: Arc<dyn UrlCache>,
) -> ShortenerService {
    ShortenerService::new(
        repository,
        cache,
        Arc::new(TimeSortableGenerator::default()),
        ShortenerSettings::default(),
    )
}

/// State backed by the in-memory repository and Moka cache.
pub fn create_test_state() -> TestContext {
    let repository = Arc::new(InMemoryUrlRepository::new());
    let cache = Arc::new(InMemoryCache::with_ttl(1_000, Duration::from_secs(60)));

    let shortener = create_shortener(repository.clone(), cache.clone());

    let state = AppState::new(
        Arc::new(shortener),
        Arc::new(StaticTokenValidator::new(TEST_TOKEN)),
        Some(BASE_URL.to_string()),
    );

    TestContext {
        state,
        repository,
        cache,
    }
}

/// State whose cache always fails.
pub fn create_state_with_unreachable_cache() -> (AppState, Arc<InMemoryUrlRepository>) {
    let repository = Arc::new(InMemoryUrlRepository::new());
    let shortener = create_shortener(repository.clone(), Arc::new(UnreachableCache));

    let state = AppState::new(
        Arc::new(shortener),
        Arc::new(StaticTokenValidator::new(TEST_TOKEN)),
        Some(BASE_URL.to_string()),
    );

    (state, repository)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn record(id: i64, short_id: &str, original_url: &str) -> UrlRecord {
    UrlRecord::new(id, short_id, original_url, Utc::now())
}
