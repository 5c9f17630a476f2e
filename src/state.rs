//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{ShortenerService, TokenValidator};

/// Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService>,
    pub token_validator: Arc<dyn TokenValidator>,
    /// Prefix for returned short URLs; `None` derives it from the `Host` header.
    pub base_url: Option<String>,
}

impl AppState {
    pub fn new(
        shortener: Arc<ShortenerService>,
        token_validator: Arc<dyn TokenValidator>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            shortener,
            token_validator,
            base_url,
        }
    }
}
