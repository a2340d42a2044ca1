//! Error types for playback control

use thiserror::Error;
use vibewave_core::{TrackId, VibeError};

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The requested track is not in the catalog
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// The track has no media reference, or the device refused it
    #[error("Track {track_id} is not playable: {reason}")]
    MediaUnplayable {
        /// Track that could not be loaded
        track_id: TrackId,
        /// What went wrong
        reason: String,
    },

    /// Operation needs a loaded track
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Audio device failure
    #[error("Audio device error: {0}")]
    Device(String),
}

impl PlaybackError {
    /// Create a device error
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

impl From<PlaybackError> for VibeError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::TrackNotFound(id) => VibeError::TrackNotFound(id),
            PlaybackError::MediaUnplayable { track_id, reason } => {
                VibeError::MediaUnplayable(track_id, reason)
            }
            PlaybackError::NoTrackLoaded => VibeError::invalid_input("no track loaded"),
            PlaybackError::Device(msg) => VibeError::audio(msg),
        }
    }
}
