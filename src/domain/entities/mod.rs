//! Core domain entities.
//!
//! - [`UrlRecord`] - A persisted mapping between an original URL and its short ID
//! - [`NewUrlRecord`] - Input for persisting a new mapping

pub mod url_record;

pub use url_record::{NewUrlRecord, UrlRecord};
