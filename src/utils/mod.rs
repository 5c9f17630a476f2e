//! Utility functions shared across layers.
//!
//! - [`short_id`] - Short identifier generation
//! - [`host`] - Public short URL construction from configuration or headers

pub mod host;
pub mod short_id;
