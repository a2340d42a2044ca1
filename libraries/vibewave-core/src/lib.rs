//! VibeWave Core
//!
//! Platform-agnostic core types, traits, and error handling for VibeWave.
//!
//! This crate provides the building blocks shared by the catalog, the
//! playlist store, the playback controller and the application shell.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist` and their identifiers
//! - **Identifier normalisation**: every track id, whether it arrived as a
//!   JSON number or string, becomes a canonical `TrackId`
//! - **Core Traits**: `TrackResolver` (catalog lookup) and `View` (rendering surface)
//! - **View contract**: `ViewCommand` in, `Notification` out
//! - **Error Handling**: unified `VibeError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use vibewave_core::types::{Playlist, PlaylistId, Track, TrackId};
//!
//! let track = Track::new(TrackId::from(7), "Night_Drive", "Unknown Artist").with_url("drive.mp3");
//! assert_eq!(track.display_title(), "Night Drive");
//!
//! let mut playlist = Playlist::new(PlaylistId::new("1700000000000"), "Road trip", "");
//! assert!(playlist.push_track(TrackId::from("7")));
//! assert!(!playlist.push_track(TrackId::from(7)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod traits;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use error::{Result, VibeError};
pub use traits::{TrackResolver, View};
pub use types::{Playlist, PlaylistId, PlaylistSummary, Track, TrackId};
pub use view::{FailureKind, Notification, PlaybackSnapshot, ViewCommand};
