//! Business logic services for the application layer.

pub mod auth_service;
pub mod shortener_service;

pub use auth_service::{AuthService, TokenClaims, TokenValidator, hash_token};
pub use shortener_service::{ShortenerService, ShortenerSettings};
