//! API route configuration.

use crate::api::handlers::{resolve_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes that require Bearer token authentication.
///
/// # Endpoints
///
/// - `POST /shorten` - Create (or return the existing) short URL
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/shorten", post(shorten_handler))
}

/// Read-only API routes.
///
/// # Endpoints
///
/// - `GET /urls/{short_id}` - Look up a record by short ID
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/urls/{short_id}", get(resolve_handler))
}
