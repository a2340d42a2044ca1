//! Integration tests for the playlist store
//!
//! Covers:
//! - CRUD semantics (create/get/add/remove/delete/rename)
//! - Persistence round trips through the file backend
//! - Degraded operation when the backend fails
//! - Properties over random track ids

use proptest::prelude::*;
use vibewave_core::{PlaylistId, TrackId};
use vibewave_storage::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PlaylistStore, StorageError,
    DEFAULT_PLAYLISTS_KEY,
};

fn memory_store() -> PlaylistStore<MemoryKeyValueStore> {
    PlaylistStore::open(MemoryKeyValueStore::new(), DEFAULT_PLAYLISTS_KEY)
}

/// Backend that fails every call
struct BrokenBackend;

impl KeyValueStore for BrokenBackend {
    fn get(&self, _key: &str) -> vibewave_storage::Result<Option<String>> {
        Err(StorageError::unavailable("quota exceeded"))
    }

    fn set(&mut self, _key: &str, _value: &str) -> vibewave_storage::Result<()> {
        Err(StorageError::unavailable("quota exceeded"))
    }
}

// ============================================================================
// CRUD
// ============================================================================

mod crud {
    use super::*;

    #[test]
    fn create_then_get_returns_empty_playlist() {
        let mut store = memory_store();
        let created = store.create("X", "");

        let fetched = store.get(&created.id).expect("playlist exists");
        assert_eq!(fetched.name, "X");
        assert!(fetched.is_empty());
    }

    #[test]
    fn add_same_track_twice_keeps_one() {
        let mut store = memory_store();
        let p = store.create("Mix", "");

        assert!(store.add_track(&p.id, 42));
        assert!(!store.add_track(&p.id, "42"));
        assert_eq!(store.get(&p.id).unwrap().len(), 1);
    }

    #[test]
    fn add_to_missing_playlist_is_noop() {
        let mut store = memory_store();
        assert!(!store.add_track(&PlaylistId::new("nope"), "1"));
        assert!(store.is_empty());
    }

    #[test]
    fn remove_absent_track_returns_false() {
        let mut store = memory_store();
        let p = store.create("Mix", "");
        store.add_track(&p.id, "1");

        assert!(!store.remove_track(&p.id, "2"));
        assert!(store.remove_track(&p.id, 1));
        assert!(store.get(&p.id).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_leaves_store_unchanged() {
        let mut store = memory_store();
        store.create("Keep", "");
        let before = store.list().to_vec();

        assert!(!store.delete(&PlaylistId::new("missing")));
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn delete_existing_removes_it() {
        let mut store = memory_store();
        let p = store.create("Gone", "");
        assert!(store.delete(&p.id));
        assert!(store.get(&p.id).is_none());
    }

    #[test]
    fn rename_updates_in_place() {
        let mut store = memory_store();
        let p = store.create("Old", "old desc");
        store.add_track(&p.id, "7");

        assert!(store.rename(&p.id, "New", "new desc"));
        let renamed = store.get(&p.id).unwrap();
        assert_eq!(renamed.name, "New");
        assert_eq!(renamed.description, "new desc");
        assert!(renamed.contains(&TrackId::from("7")));

        assert!(!store.rename(&PlaylistId::new("missing"), "N", ""));
    }

    #[test]
    fn list_keeps_creation_order() {
        let mut store = memory_store();
        store.create("first", "");
        store.create("second", "");
        store.create("third", "");

        let names: Vec<&str> = store.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }
}

// ============================================================================
// Persistence
// ============================================================================

mod persistence {
    use super::*;

    #[test]
    fn reload_from_file_backend_preserves_playlists() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = PlaylistStore::open(FileKeyValueStore::new(dir.path()), DEFAULT_PLAYLISTS_KEY);
        let a = store.create("A", "first");
        let b = store.create("B", "");
        for id in ["3", "1", "2"] {
            store.add_track(&a.id, id);
        }
        store.add_track(&b.id, 9);
        let before = store.list().to_vec();

        let reloaded =
            PlaylistStore::open(FileKeyValueStore::new(dir.path()), DEFAULT_PLAYLISTS_KEY);
        assert_eq!(reloaded.list(), before.as_slice());

        let order: Vec<&str> = reloaded
            .get(&a.id)
            .unwrap()
            .song_ids()
            .iter()
            .map(TrackId::as_str)
            .collect();
        assert_eq!(order, vec!["3", "1", "2"]);
    }

    #[test]
    fn every_mutation_writes_a_snapshot() {
        let mut store = memory_store();
        let p = store.create("Mix", "");
        store.add_track(&p.id, "5");

        let raw = store
            .backend()
            .get(DEFAULT_PLAYLISTS_KEY)
            .unwrap()
            .expect("snapshot written");
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["songIds"], serde_json::json!(["5"]));
        assert_eq!(value[0]["name"], "Mix");
    }

    #[test]
    fn loads_records_written_by_older_clients() {
        let mut backend = MemoryKeyValueStore::new();
        backend
            .set(
                DEFAULT_PLAYLISTS_KEY,
                r#"[{"id":"1700000000000","name":"Legacy","description":"","songIds":[1,2],"createdAt":"2024-05-01T10:00:00.000Z"},
                   {"id":"1700000000001","name":"No songs"}]"#,
            )
            .unwrap();

        let mut store = PlaylistStore::open(backend, DEFAULT_PLAYLISTS_KEY);
        assert_eq!(store.len(), 2);

        let legacy = PlaylistId::new("1700000000000");
        assert!(!store.add_track(&legacy, "1"));
        assert!(store.get(&PlaylistId::new("1700000000001")).unwrap().is_empty());
    }
}

// ============================================================================
// Degraded backend
// ============================================================================

mod degraded {
    use super::*;

    #[test]
    fn broken_backend_keeps_working_in_memory() {
        let mut store = PlaylistStore::open(BrokenBackend, DEFAULT_PLAYLISTS_KEY);
        assert!(store.is_degraded());
        assert!(store.take_failure().is_some());
        assert!(store.take_failure().is_none());

        let p = store.create("Offline", "");
        assert!(store.add_track(&p.id, "1"));
        assert_eq!(store.get(&p.id).unwrap().len(), 1);
        assert!(store.is_degraded());
        assert!(matches!(
            store.take_failure(),
            Some(StorageError::Unavailable(_))
        ));
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn add_then_remove_never_leaves_track(ids in prop::collection::vec("[a-z0-9]{1,6}", 1..20)) {
        let mut store = memory_store();
        let p = store.create("P", "");

        for id in &ids {
            store.add_track(&p.id, id.as_str());
            store.add_track(&p.id, id.as_str());
        }
        let playlist = store.get(&p.id).unwrap();
        for id in &ids {
            let count = playlist.song_ids().iter().filter(|t| t.as_str() == id).count();
            prop_assert_eq!(count, 1);
        }

        for id in &ids {
            store.remove_track(&p.id, id.as_str());
            prop_assert!(!store.get(&p.id).unwrap().contains(&TrackId::from(id.as_str())));
        }
    }

    #[test]
    fn numeric_ids_match_their_string_form(n in 0u32..100_000) {
        let mut store = memory_store();
        let p = store.create("P", "");
        prop_assert!(store.add_track(&p.id, n));
        prop_assert!(!store.add_track(&p.id, n.to_string()));
        prop_assert!(store.remove_track(&p.id, n.to_string()));
    }
}
