//! VibeWave Catalog
//!
//! Read-only song catalog fetched over HTTP.
//!
//! The feed is fetched once per session and cached in memory. Field
//! mapping is defensive: missing fields get placeholders, numeric ids are
//! canonicalised to strings and the media reference is taken from the
//! first non-empty of `src`, `url` and `audio`.
//!
//! [`SongCatalog::fetch_all`] never fails; a network error is logged and
//! yields an empty catalog. Use [`SongCatalog::try_fetch_all`] to see
//! the error.

#![forbid(unsafe_code)]

mod catalog;
mod error;
pub mod mapping;

pub use catalog::{CatalogConfig, SongCatalog, DEFAULT_CATALOG_URL};
pub use error::{CatalogError, Result};
