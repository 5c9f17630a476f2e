//! Repository trait for the durable URL store.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Source-of-truth store for URL records.
///
/// Absence of a match is `Ok(None)`, distinct from a query error.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - process-local implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Persists a new record and returns it with `id` and `created_at` assigned.
    ///
    /// When a record for the same original URL already exists (for example a
    /// concurrent writer got there first), that existing record is returned
    /// unchanged and nothing is inserted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if `short_id` is already taken by another
    /// original URL.
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn save(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError>;

    /// Finds a record by its original URL (exact, byte-for-byte match).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn find_by_original(&self, original_url: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Finds a record by its short ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
