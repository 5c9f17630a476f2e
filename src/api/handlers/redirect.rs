//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short ID to its original URL.
///
/// # Endpoint
///
/// `GET /{short_id}`
///
/// Lookup goes through the shortener's cache-aside path, so a cold cache is
/// backfilled on the first hit.
///
/// # Errors
///
/// Returns 404 Not Found if the short ID doesn't exist.
pub async fn redirect_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let Some(record) = state.shortener.find_by_short_id(&short_id).await? else {
        return Err(AppError::not_found(
            "Short URL not found",
            json!({ "short_id": short_id }),
        ));
    };

    debug!(%short_id, "Redirecting");

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, record.original_url)],
    ))
}
