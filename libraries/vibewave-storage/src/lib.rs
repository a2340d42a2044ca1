//! VibeWave Storage
//!
//! Key-value persistence and the playlist store.
//!
//! The playlist collection is one JSON array stored under a single key
//! (`vibeWavePlaylists` by default). Backends implement [`KeyValueStore`];
//! [`FileKeyValueStore`] keeps one file per key in a data directory and
//! [`MemoryKeyValueStore`] keeps everything in a map.
//!
//! # Example
//!
//! ```rust
//! use vibewave_storage::{MemoryKeyValueStore, PlaylistStore, DEFAULT_PLAYLISTS_KEY};
//!
//! let mut store = PlaylistStore::open(MemoryKeyValueStore::new(), DEFAULT_PLAYLISTS_KEY);
//! let playlist = store.create("Focus", "deep work");
//! assert!(store.add_track(&playlist.id, 42));
//! assert!(!store.add_track(&playlist.id, "42"));
//! assert_eq!(store.get(&playlist.id).map(|p| p.len()), Some(1));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod kv;
pub mod playlists;

pub use error::{Result, StorageError};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use playlists::{PlaylistStore, DEFAULT_PLAYLISTS_KEY};
