//! Public short URL construction.

use crate::AppError;
use axum::http::{HeaderMap, header};
use serde_json::json;

/// Builds the public URL for `short_id`.
///
/// Uses `base_url` when configured. Otherwise falls back to the request's
/// `Host` header (port included) over plain `http`.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if no base URL is configured and the
/// `Host` header is missing or not valid UTF-8.
pub fn short_url(
    base_url: Option<&str>,
    headers: &HeaderMap,
    short_id: &str,
) -> Result<String, AppError> {
    if let Some(base) = base_url {
        return Ok(format!("{}/{}", base.trim_end_matches('/'), short_id));
    }

    let host = headers
        .get(header::HOST)
        .ok_or_else(|| AppError::bad_request("Missing Host header", json!({})))?
        .to_str()
        .map_err(|_| AppError::bad_request("Invalid Host header", json!({})))?;

    Ok(format!("http://{}/{}", host, short_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_host(host: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static(host));
        headers
    }

    #[test]
    fn test_base_url_wins() {
        let headers = headers_with_host("ignored.com");
        let url = short_url(Some("https://s.example.com/"), &headers, "abc123").unwrap();
        assert_eq!(url, "https://s.example.com/abc123");
    }

    #[test]
    fn test_host_header_fallback() {
        let headers = headers_with_host("localhost:3000");
        let url = short_url(None, &headers, "abc123").unwrap();
        assert_eq!(url, "http://localhost:3000/abc123");
    }

    #[test]
    fn test_missing_host() {
        let result = short_url(None, &HeaderMap::new(), "abc123");
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }
}
