//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access and are implemented by concrete
//! repositories in `crate::infrastructure::persistence`. Mock implementations
//! are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`UrlRepository`] - Durable URL records
//! - [`TokenRepository`] - API token authentication

pub mod token_repository;
pub mod url_repository;

pub use token_repository::{ApiToken, TokenRepository};
pub use url_repository::UrlRepository;

#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use url_repository::MockUrlRepository;
