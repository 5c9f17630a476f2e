//! DTOs for link shortening endpoint.

use serde::Deserialize;
use url::Url;
use validator::{Validate, ValidationError};

/// Longest URL accepted for shortening.
pub const MAX_URL_LENGTH: u64 = 2048;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(length(min = 1, max = 2048, message = "URL must be 1 to 2048 characters"))]
    #[validate(url(message = "Invalid URL format"))]
    #[validate(custom(function = "validate_http_scheme"))]
    pub url: String,
}

/// The URL is stored and later echoed in a `Location` header verbatim, so it
/// must already be in its serialized form: the parser silently drops tabs and
/// newlines and trims surrounding spaces, which a header value cannot carry.
fn validate_http_scheme(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(ValidationError::new("characters")
            .with_message("URL must not contain whitespace or control characters".into()));
    }

    let parsed = Url::parse(value).map_err(|_| ValidationError::new("url"))?;

    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(()),
        _ => Err(ValidationError::new("scheme")
            .with_message("Only http and https URLs can be shortened".into())),
    }
}
