//! Short identifier generation.
//!
//! Identifiers come from a UUIDv7: 48 bits of millisecond timestamp followed by
//! a per-process monotonic counter and random bits. The value is encoded as
//! URL-safe base64 without padding and truncated to the display width.
//!
//! Truncation keeps the low-order end of the encoding (counter and random
//! bits) rather than the timestamp prefix, so identifiers issued within the
//! same second still differ. It does discard global uniqueness: collisions are
//! possible and are resolved by the repository's uniqueness check plus
//! regeneration in [`crate::application::services::ShortenerService`].

use base64::Engine as _;
use uuid::Uuid;

/// Default display width of a short identifier.
pub const DEFAULT_SHORT_ID_LENGTH: usize = 6;

/// Smallest accepted width.
pub const MIN_SHORT_ID_LENGTH: usize = 4;

/// Largest accepted width; wider values would reach into the version and
/// variant bits of the UUID.
pub const MAX_SHORT_ID_LENGTH: usize = 10;

/// Produces short identifiers.
#[cfg_attr(test, mockall::automock)]
pub trait ShortIdGenerator: Send + Sync {
    /// Returns the next identifier.
    fn next_id(&self) -> String;
}

/// [`ShortIdGenerator`] backed by time-sortable UUIDv7 values.
#[derive(Debug, Clone)]
pub struct TimeSortableGenerator {
    length: usize,
}

impl TimeSortableGenerator {
    /// Creates a generator producing identifiers of `length` characters.
    ///
    /// `length` is clamped to `MIN_SHORT_ID_LENGTH..=MAX_SHORT_ID_LENGTH`.
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(MIN_SHORT_ID_LENGTH, MAX_SHORT_ID_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for TimeSortableGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_ID_LENGTH)
    }
}

impl ShortIdGenerator for TimeSortableGenerator {
    fn next_id(&self) -> String {
        let bytes = Uuid::now_v7().into_bytes();
        // Bytes 7..16 encode to exactly 12 characters with no partial sextet.
        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes[7..]);
        encoded[encoded.len() - self.length..].to_string()
    }
}
