/// Core error types for VibeWave
use thiserror::Error;

use crate::types::{PlaylistId, TrackId};
use crate::view::FailureKind;

/// Result type alias using `VibeError`
pub type Result<T> = std::result::Result<T, VibeError>;

/// Core error type for VibeWave
#[derive(Error, Debug)]
pub enum VibeError {
    /// The song catalog could not be fetched
    #[error("Catalog fetch failed: {0}")]
    NetworkFetchFailed(String),

    /// Track not found in the catalog
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Track has no playable media reference, or the media failed to load
    #[error("Track {0} is not playable: {1}")]
    MediaUnplayable(TrackId, String),

    /// Persistence backend cannot be reached
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Playlist not found
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Audio device errors
    #[error("Audio error: {0}")]
    Audio(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl VibeError {
    /// Create a network fetch error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkFetchFailed(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Create an audio error
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// The failure category reported to the view layer.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NetworkFetchFailed(_) => FailureKind::NetworkFetchFailed,
            Self::TrackNotFound(_) => FailureKind::TrackNotFound,
            Self::MediaUnplayable(..) | Self::Audio(_) => FailureKind::MediaUnplayable,
            Self::StorageUnavailable(_) | Self::Io(_) | Self::Serialization(_) => {
                FailureKind::StorageUnavailable
            }
            Self::PlaylistNotFound(_) | Self::InvalidInput(_) | Self::Other(_) => {
                FailureKind::InvalidCommand
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            VibeError::network("offline").kind(),
            FailureKind::NetworkFetchFailed
        );
        assert_eq!(
            VibeError::TrackNotFound(TrackId::from(3)).kind(),
            FailureKind::TrackNotFound
        );
        assert_eq!(
            VibeError::MediaUnplayable(TrackId::from("x"), "no source".into()).kind(),
            FailureKind::MediaUnplayable
        );
        assert_eq!(
            VibeError::storage("disk full").kind(),
            FailureKind::StorageUnavailable
        );
        assert_eq!(
            VibeError::PlaylistNotFound(PlaylistId::new("1")).kind(),
            FailureKind::InvalidCommand
        );
    }

    #[test]
    fn messages_name_the_track() {
        let err = VibeError::TrackNotFound(TrackId::from(42));
        assert_eq!(err.to_string(), "Track not found: 42");
    }
}
