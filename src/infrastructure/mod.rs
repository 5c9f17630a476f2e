//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the storage contracts defined by the domain
//! layer.
//!
//! # Modules
//!
//! - [`cache`] - Cache variants (Redis, in-memory, disabled)
//! - [`persistence`] - Durable repository variants (PostgreSQL, in-memory)

pub mod cache;
pub mod persistence;
