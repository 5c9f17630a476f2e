//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, service wiring, and Axum server lifecycle.

use crate::application::services::{AuthService, ShortenerService, ShortenerSettings};
use crate::config::{CacheBackend, Config};
use crate::infrastructure::cache::{InMemoryCache, NullCache, RedisCache, UrlCache};
use crate::infrastructure::persistence::{PgTokenRepository, PgUrlRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::short_id::TimeSortableGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Opens the PostgreSQL pool using the configured limits.
///
/// # Errors
///
/// Returns an error if no connection can be established.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Builds the configured cache backend.
///
/// An unreachable Redis degrades to [`NullCache`] instead of failing startup.
pub async fn build_cache(config: &Config) -> Arc<dyn UrlCache> {
    match (config.cache_backend, &config.redis_url) {
        (CacheBackend::Redis, Some(redis_url)) => {
            match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                    Arc::new(NullCache::new())
                }
            }
        }
        (CacheBackend::Memory, _) => {
            tracing::info!(
                capacity = config.cache_memory_capacity,
                "Cache enabled (in-memory)"
            );
            Arc::new(InMemoryCache::with_ttl(
                config.cache_memory_capacity,
                Duration::from_secs(config.cache_ttl_seconds),
            ))
        }
        _ => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

/// Wires the shortener over the given pool and cache.
pub fn build_shortener(config: &Config, pool: Arc<PgPool>, cache: Arc<dyn UrlCache>) -> ShortenerService {
    ShortenerService::new(
        Arc::new(PgUrlRepository::new(pool)),
        cache,
        Arc::new(TimeSortableGenerator::new(config.short_id_length)),
        ShortenerSettings {
            store_timeout: config.store_timeout(),
            max_attempts: config.shorten_max_attempts,
            cache_timeout: config.cache_timeout(),
        },
    )
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Cache backend (Redis, in-memory or NullCache)
/// - Axum HTTP server with graceful shutdown on Ctrl-C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = Arc::new(connect_pool(&config).await?);

    sqlx::migrate!("./migrations")
        .run(pool.as_ref())
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");

    let cache = build_cache(&config).await;
    let shortener = Arc::new(build_shortener(&config, pool.clone(), cache));

    let auth_service = AuthService::new(
        Arc::new(PgTokenRepository::new(pool.clone())),
        config.token_signing_secret.clone(),
    );

    let state = AppState::new(shortener, Arc::new(auth_service), config.base_url.clone());

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
