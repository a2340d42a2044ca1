/// Playlist domain types
use crate::types::{PlaylistId, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// User-named ordered collection of track references
///
/// The serialized layout is the persisted record:
/// `{id, name, description, songIds, createdAt}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Free-form description
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    /// Ordered track references (no duplicates)
    #[serde(default, deserialize_with = "lenient_song_ids")]
    song_ids: Vec<TrackId>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Create a new, empty playlist stamped with the current time
    pub fn new(id: PlaylistId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            song_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Track ids in playlist order
    pub fn song_ids(&self) -> &[TrackId] {
        &self.song_ids
    }

    /// Append a track. Returns `false` if it was already present.
    pub fn push_track(&mut self, track_id: impl Into<TrackId>) -> bool {
        let track_id = track_id.into();
        if self.song_ids.contains(&track_id) {
            return false;
        }
        self.song_ids.push(track_id);
        true
    }

    /// Remove a track. Returns `false` if it was not present.
    pub fn remove_track(&mut self, track_id: &TrackId) -> bool {
        let before = self.song_ids.len();
        self.song_ids.retain(|id| id != track_id);
        self.song_ids.len() != before
    }

    /// Check whether the playlist references a track
    pub fn contains(&self, track_id: &TrackId) -> bool {
        self.song_ids.contains(track_id)
    }

    /// Number of track references
    pub fn len(&self) -> usize {
        self.song_ids.len()
    }

    /// True when the playlist has no tracks
    pub fn is_empty(&self) -> bool {
        self.song_ids.is_empty()
    }
}

/// Lightweight listing entry for the playlist overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    /// Playlist identifier
    pub id: PlaylistId,
    /// Playlist name
    pub name: String,
    /// Number of track references
    pub track_count: usize,
    /// Cover of the first resolvable track, if any
    pub cover: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Records written by older clients may hold numbers, or no array at all.
fn lenient_song_ids<'de, D>(deserializer: D) -> Result<Vec<TrackId>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    let mut ids: Vec<TrackId> = Vec::with_capacity(items.len());
    for id in items.iter().filter_map(TrackId::from_json) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn playlist() -> Playlist {
        Playlist::new(PlaylistId::new("1"), "Mix", "")
    }

    #[test]
    fn push_rejects_duplicates_across_representations() {
        let mut p = playlist();
        assert!(p.push_track(42));
        assert!(!p.push_track("42"));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn remove_reports_absence() {
        let mut p = playlist();
        p.push_track("a");
        assert!(!p.remove_track(&TrackId::from("b")));
        assert!(p.remove_track(&TrackId::from("a")));
        assert!(p.is_empty());
    }

    #[test]
    fn serializes_camel_case_layout() {
        let mut p = playlist();
        p.push_track(1);
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["songIds"], json!(["1"]));
        assert!(value["createdAt"].is_string());
        assert_eq!(value["description"], json!(""));
    }

    #[test]
    fn tolerates_malformed_song_ids() {
        let raw = json!({
            "id": "5",
            "name": "Old",
            "description": null,
            "songIds": "not-an-array",
            "createdAt": "2024-01-01T00:00:00Z"
        });
        let p: Playlist = serde_json::from_value(raw).unwrap();
        assert!(p.is_empty());
        assert_eq!(p.description, "");
    }

    #[test]
    fn canonicalises_numeric_song_ids() {
        let raw = json!({
            "id": "5",
            "name": "Old",
            "songIds": [1, "2", 1.0, null]
        });
        let p: Playlist = serde_json::from_value(raw).unwrap();
        let ids: Vec<&str> = p.song_ids().iter().map(TrackId::as_str).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
