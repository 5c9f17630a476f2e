//! Application layer services implementing business logic.
//!
//! Services consume the repository and cache traits and expose the
//! operations HTTP handlers and the admin CLI call.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Cache-aside shortening and resolution
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
