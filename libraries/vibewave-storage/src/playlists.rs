//! Playlist store
//!
//! Owns every playlist record for the session. The whole collection is
//! written back to the key-value backend after each mutation. When the
//! backend fails the store keeps working in memory and remembers the
//! failure so the caller can report it.

use crate::error::{Result, StorageError};
use crate::kv::KeyValueStore;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};
use vibewave_core::{Playlist, PlaylistId, TrackId};

/// Default key under which the playlist collection is stored
pub const DEFAULT_PLAYLISTS_KEY: &str = "vibeWavePlaylists";

/// Playlist CRUD on top of a [`KeyValueStore`]
pub struct PlaylistStore<S> {
    backend: S,
    key: String,
    playlists: Vec<Playlist>,
    degraded: bool,
    pending_failure: Option<StorageError>,
}

impl<S: KeyValueStore> PlaylistStore<S> {
    /// Load the playlist collection stored under `key`.
    ///
    /// Never fails: an unreadable backend starts the store empty and
    /// degraded, malformed records are skipped.
    pub fn open(backend: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let mut store = Self {
            backend,
            key,
            playlists: Vec::new(),
            degraded: false,
            pending_failure: None,
        };

        match store.backend.get(&store.key) {
            Ok(Some(raw)) => store.playlists = parse_collection(&raw),
            Ok(None) => debug!(key = %store.key, "No saved playlists"),
            Err(e) => {
                warn!(key = %store.key, error = %e, "Playlist storage unavailable, continuing in memory");
                store.degraded = true;
                store.pending_failure = Some(e);
            }
        }

        info!(count = store.playlists.len(), "Loaded playlists");
        store
    }

    /// Create an empty playlist and persist it
    pub fn create(&mut self, name: impl Into<String>, description: impl Into<String>) -> Playlist {
        let id = self.next_id();
        let playlist = Playlist::new(id, name, description);
        debug!(id = %playlist.id, name = %playlist.name, "Created playlist");

        self.playlists.push(playlist.clone());
        self.persist();
        playlist
    }

    /// Look up a playlist
    pub fn get(&self, id: &PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|p| &p.id == id)
    }

    /// Append a track. `false` if the playlist is missing or already holds it.
    pub fn add_track(&mut self, playlist_id: &PlaylistId, track_id: impl Into<TrackId>) -> bool {
        let track_id = track_id.into();
        let Some(playlist) = self.get_mut(playlist_id) else {
            return false;
        };
        if !playlist.push_track(track_id) {
            return false;
        }
        self.persist();
        true
    }

    /// Remove a track. `false` if the playlist is missing or does not hold it.
    pub fn remove_track(&mut self, playlist_id: &PlaylistId, track_id: impl Into<TrackId>) -> bool {
        let track_id = track_id.into();
        let Some(playlist) = self.get_mut(playlist_id) else {
            return false;
        };
        if !playlist.remove_track(&track_id) {
            return false;
        }
        self.persist();
        true
    }

    /// Delete a playlist. `false` if it does not exist.
    pub fn delete(&mut self, playlist_id: &PlaylistId) -> bool {
        let before = self.playlists.len();
        self.playlists.retain(|p| &p.id != playlist_id);
        if self.playlists.len() == before {
            return false;
        }
        debug!(id = %playlist_id, "Deleted playlist");
        self.persist();
        true
    }

    /// Replace name and description. `false` if the playlist does not exist.
    pub fn rename(
        &mut self,
        playlist_id: &PlaylistId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> bool {
        let Some(playlist) = self.get_mut(playlist_id) else {
            return false;
        };
        playlist.name = name.into();
        playlist.description = description.into();
        self.persist();
        true
    }

    /// All playlists in creation order
    pub fn list(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Number of playlists
    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    /// True when there are no playlists
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// True while the most recent backend access failed
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Take the last backend failure, if one has not been reported yet
    pub fn take_failure(&mut self) -> Option<StorageError> {
        self.pending_failure.take()
    }

    /// Backing key-value store
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Give back the backing store
    pub fn into_backend(self) -> S {
        self.backend
    }

    fn get_mut(&mut self, id: &PlaylistId) -> Option<&mut Playlist> {
        self.playlists.iter_mut().find(|p| &p.id == id)
    }

    fn next_id(&self) -> PlaylistId {
        let mut millis = Utc::now().timestamp_millis();
        while self.playlists.iter().any(|p| p.id.as_str() == millis.to_string()) {
            millis += 1;
        }
        PlaylistId::from_millis(millis)
    }

    fn persist(&mut self) {
        match self.write_snapshot() {
            Ok(()) => {
                if self.degraded {
                    info!(key = %self.key, "Playlist storage recovered");
                }
                self.degraded = false;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to persist playlists, keeping changes in memory");
                self.degraded = true;
                self.pending_failure = Some(e);
            }
        }
    }

    fn write_snapshot(&mut self) -> Result<()> {
        let snapshot = serde_json::to_string(&self.playlists)?;
        self.backend.set(&self.key, &snapshot)
    }
}

/// Decode the stored collection, skipping records that cannot be read
fn parse_collection(raw: &str) -> Vec<Playlist> {
    let records: Vec<Value> = match serde_json::from_str(raw) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!("Saved playlists are not a list, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "Saved playlists are not valid JSON, starting empty");
            return Vec::new();
        }
    };

    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Playlist>(record) {
            Ok(playlist) => Some(playlist),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable playlist record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;

    #[test]
    fn ids_do_not_collide_within_one_millisecond() {
        let mut store = PlaylistStore::open(MemoryKeyValueStore::new(), DEFAULT_PLAYLISTS_KEY);
        let a = store.create("A", "");
        let b = store.create("B", "");
        let c = store.create("C", "");
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn skips_unreadable_records() {
        let mut backend = MemoryKeyValueStore::new();
        backend
            .set(
                DEFAULT_PLAYLISTS_KEY,
                r#"[{"id":"1","name":"Ok","songIds":[3]},{"name":"no id"}]"#,
            )
            .unwrap();
        let store = PlaylistStore::open(backend, DEFAULT_PLAYLISTS_KEY);
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].song_ids(), &[TrackId::from("3")]);
    }

    #[test]
    fn garbage_starts_empty() {
        let mut backend = MemoryKeyValueStore::new();
        backend.set(DEFAULT_PLAYLISTS_KEY, "{not json").unwrap();
        let store = PlaylistStore::open(backend, DEFAULT_PLAYLISTS_KEY);
        assert!(store.is_empty());
        assert!(!store.is_degraded());
    }
}
