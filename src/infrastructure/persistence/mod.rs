//! Durable repository implementations.
//!
//! # Repositories
//!
//! - [`PgUrlRepository`] - URL records in PostgreSQL
//! - [`InMemoryUrlRepository`] - URL records in process memory
//! - [`PgTokenRepository`] - API token storage and validation

pub mod memory_url_repository;
pub mod pg_token_repository;
pub mod pg_url_repository;

pub use memory_url_repository::InMemoryUrlRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_url_repository::PgUrlRepository;
