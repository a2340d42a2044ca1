//! Error types for the song catalog.

use thiserror::Error;

/// Errors that can occur while fetching the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog URL is empty or not HTTP(S)
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Catalog host answered with a non-success status
    #[error("Catalog server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Catalog host is offline or did not answer in time
    #[error("Catalog unreachable: {0}")]
    ServerUnreachable(String),

    /// Body was not JSON, or not a track list
    #[error("Failed to parse catalog: {0}")]
    ParseError(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<CatalogError> for vibewave_core::VibeError {
    fn from(err: CatalogError) -> Self {
        vibewave_core::VibeError::network(err.to_string())
    }
}
