//! View contract: commands in, notifications out.

use crate::types::{PlaylistId, PlaylistSummary, Track, TrackId};
use serde::{Deserialize, Serialize};

/// Failure categories surfaced to the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Catalog could not be fetched; the catalog is empty
    NetworkFetchFailed,
    /// A track id did not resolve against the catalog
    TrackNotFound,
    /// The track has no usable media, or the device could not load it
    MediaUnplayable,
    /// Playlists could not be persisted; changes live in memory only
    StorageUnavailable,
    /// The command referenced something that does not exist or was malformed
    InvalidCommand,
}

/// Snapshot of the transport, sent whenever it changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Loaded track, if any
    pub track: Option<Track>,
    /// Whether audio is running
    pub playing: bool,
    /// Position in seconds
    pub position: f64,
    /// Duration in seconds (0 when unknown)
    pub duration: f64,
}

impl PlaybackSnapshot {
    /// Snapshot of an idle controller
    pub fn idle() -> Self {
        Self {
            track: None,
            playing: false,
            position: 0.0,
            duration: 0.0,
        }
    }
}

/// Notifications rendered by a [`crate::View`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Track, playing flag, position or duration changed
    PlaybackStateChanged(PlaybackSnapshot),

    /// Volume level or mute flag changed
    VolumeChanged {
        /// Level 0-100
        level: u8,
        /// Mute flag
        muted: bool,
    },

    /// Shuffle or repeat toggled
    ModesChanged {
        /// Shuffle flag
        shuffle: bool,
        /// Repeat flag
        repeat: bool,
    },

    /// The set of playlists changed
    PlaylistListChanged {
        /// All playlists in creation order
        playlists: Vec<PlaylistSummary>,
    },

    /// A playlist's name, description or tracks changed
    PlaylistContentsChanged {
        /// Playlist that changed
        playlist_id: PlaylistId,
        /// Current name
        name: String,
        /// Current description
        description: String,
        /// Resolved tracks, unresolved ids skipped
        tracks: Vec<Track>,
    },

    /// Result of a search, or the full catalog for an empty query
    SearchResults {
        /// Query as typed
        query: String,
        /// Matching tracks in catalog order
        tracks: Vec<Track>,
    },

    /// Something the listener asked for did not happen
    Failure {
        /// Failure category
        kind: FailureKind,
        /// Human-readable message
        message: String,
    },

    /// Informational message (e.g. "already in the playlist")
    Info {
        /// Message text
        message: String,
    },
}

impl Notification {
    /// Build a failure notification
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    /// Build an informational notification
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }
}

/// User intents forwarded by the view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ViewCommand {
    /// Create a new, empty playlist
    CreatePlaylist {
        /// Playlist name
        name: String,
        /// Description
        description: String,
    },
    /// Rename a playlist and replace its description
    RenamePlaylist {
        /// Target playlist
        playlist_id: PlaylistId,
        /// New name
        name: String,
        /// New description
        description: String,
    },
    /// Delete a playlist
    DeletePlaylist {
        /// Target playlist
        playlist_id: PlaylistId,
    },
    /// Append a track to a playlist
    AddTrack {
        /// Target playlist
        playlist_id: PlaylistId,
        /// Track to add
        track_id: TrackId,
    },
    /// Remove a track from a playlist
    RemoveTrack {
        /// Target playlist
        playlist_id: PlaylistId,
        /// Track to remove
        track_id: TrackId,
    },
    /// Make a playlist the navigation context and show it
    OpenPlaylist {
        /// Playlist to open
        playlist_id: PlaylistId,
    },
    /// Return to the full catalog as navigation context
    OpenCatalog,
    /// Play a track, or toggle it if it is already current
    Play {
        /// Track to play
        track_id: TrackId,
    },
    /// Play/pause button
    TogglePlayPause,
    /// Next track
    Next,
    /// Previous track, or restart
    Previous,
    /// Seek to an absolute position
    Seek {
        /// Position in seconds
        position: f64,
    },
    /// Seek relative to the current position
    SeekBy {
        /// Offset in seconds (negative rewinds)
        delta: f64,
    },
    /// Set volume level (unmutes)
    SetVolume {
        /// Level 0-100
        level: u8,
    },
    /// Mute toggle
    ToggleMute,
    /// Shuffle toggle
    ToggleShuffle,
    /// Repeat toggle
    ToggleRepeat,
    /// Search the catalog
    Search {
        /// Query text
        query: String,
    },
    /// Re-send the playlist overview
    ListPlaylists,
    /// Re-send one playlist's contents
    ShowPlaylist {
        /// Playlist to show
        playlist_id: PlaylistId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commands_use_tagged_layout() {
        let cmd: ViewCommand =
            serde_json::from_value(json!({"command": "add_track", "playlist_id": "1", "track_id": 7}))
                .unwrap();
        assert_eq!(
            cmd,
            ViewCommand::AddTrack {
                playlist_id: PlaylistId::new("1"),
                track_id: TrackId::from("7"),
            }
        );
    }

    #[test]
    fn failure_helper_sets_kind() {
        let n = Notification::failure(FailureKind::TrackNotFound, "gone");
        assert!(matches!(
            n,
            Notification::Failure {
                kind: FailureKind::TrackNotFound,
                ..
            }
        ));
    }
}
