//! Handler for short ID lookup.

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde_json::json;

use crate::api::dto::url_record::UrlRecordResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::host::short_url;

/// Returns the record behind a short ID without redirecting.
///
/// # Endpoint
///
/// `GET /api/urls/{short_id}`
///
/// # Errors
///
/// Returns 404 Not Found if neither the cache nor the store knows the ID.
pub async fn resolve_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UrlRecordResponse>, AppError> {
    let record = state
        .shortener
        .find_by_short_id(&short_id)
        .await?
        .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "short_id": short_id })))?;

    let short_url = short_url(state.base_url.as_deref(), &headers, &record.short_id)?;

    Ok(Json(UrlRecordResponse::new(record, short_url)))
}
