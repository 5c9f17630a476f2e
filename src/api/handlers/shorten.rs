//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::HeaderMap};
use validator::Validate;

use crate::api::dto::shorten::ShortenRequest;
use crate::api::dto::url_record::UrlRecordResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::host::short_url;

/// Creates a short URL, or returns the existing one for a known URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_id": "Xk3_9a",
///   "short_url": "https://s.example.com/Xk3_9a",
///   "original_url": "https://example.com",
///   "created_at": "2025-01-01T12:00:00Z"
/// }
/// ```
///
/// Shortening the same URL again returns the same `short_id`.
///
/// # Errors
///
/// - 400 if the URL is empty, longer than 2048 characters or not http/https
/// - 401 if the bearer token is missing or invalid (see auth middleware)
/// - 500 if the durable store fails or times out
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<UrlRecordResponse>, AppError> {
    payload.validate()?;

    let record = state.shortener.shorten(&payload.url).await?;
    let short_url = short_url(state.base_url.as_deref(), &headers, &record.short_id)?;

    Ok(Json(UrlRecordResponse::new(record, short_url)))
}
