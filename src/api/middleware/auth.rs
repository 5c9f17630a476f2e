//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Authenticates requests using Bearer tokens from Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// On success the [`TokenClaims`] are inserted into the request extensions
/// before the request continues.
///
/// # Errors
///
/// Returns `401 Unauthorized` (with `WWW-Authenticate: Bearer`) if the header
/// is missing or malformed, or the validator rejects the token.
///
/// [`TokenClaims`]: crate::application::services::TokenClaims
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let claims = st.token_validator.validate(&token).await?;
    tracing::debug!(token_id = claims.token_id, token_name = %claims.name, "Token accepted");

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
