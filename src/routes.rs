//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{short_id}`           - Redirect to the original URL (public)
//! - `GET  /health`               - Health check: database and cache (public)
//! - `GET  /api/urls/{short_id}`  - Record lookup (public)
//! - `POST /api/shorten`          - Shorten a URL (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Authentication** - Bearer token on write routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .merge(api::routes::public_routes());

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/{short_id}", get(redirect_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
