//! Caching layer mirroring the durable repository.
//!
//! Provides the [`UrlCache`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`InMemoryCache`] - Process-local Moka cache
//! - [`NullCache`] - Cache absent; every lookup misses

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::InMemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, UrlCache};

#[cfg(test)]
pub use service::MockUrlCache;
