//! Feed-to-track mapping.
//!
//! The catalog feed is loosely shaped. Every field may be missing, ids may
//! be numbers, and the media reference goes by several names.

use crate::error::{CatalogError, Result};
use serde_json::{Map, Value};
use tracing::debug;
use vibewave_core::{Track, TrackId};

/// Title used when the feed omits one
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Artist used when the feed omits one
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Field names that may carry the playable media reference, by priority
const MEDIA_FIELDS: [&str; 3] = ["src", "url", "audio"];

/// Map a decoded feed body into tracks.
///
/// Accepts a bare array, an object with a `songs` array, or an object whose
/// first array-valued field holds the tracks. An object without any array
/// is an empty catalog.
pub fn parse_catalog(body: Value) -> Result<Vec<Track>> {
    let entries = match body {
        Value::Array(entries) => entries,
        Value::Object(mut fields) => match fields.remove("songs") {
            Some(Value::Array(entries)) => entries,
            _ => first_array(fields).unwrap_or_default(),
        },
        other => {
            return Err(CatalogError::ParseError(format!(
                "expected a list of songs, got {}",
                kind_of(&other)
            )))
        }
    };

    let tracks: Vec<Track> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match entry {
            Value::Object(fields) => Some(map_track(index, fields)),
            other => {
                debug!(index, kind = kind_of(other), "Skipping non-object catalog entry");
                None
            }
        })
        .collect();

    Ok(tracks)
}

fn first_array(fields: Map<String, Value>) -> Option<Vec<Value>> {
    fields.into_iter().find_map(|(_, value)| match value {
        Value::Array(entries) => Some(entries),
        _ => None,
    })
}

fn map_track(index: usize, fields: &Map<String, Value>) -> Track {
    let id = fields
        .get("id")
        .and_then(TrackId::from_json)
        .unwrap_or_else(|| TrackId::new(format!("song-{index}")));

    let title = text(fields, "title").unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let artist = text(fields, "artist").unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
    let cover = text(fields, "cover").unwrap_or_default();
    let url = MEDIA_FIELDS
        .iter()
        .filter_map(|key| text(fields, key))
        .find(|value| !value.is_empty())
        .unwrap_or_default();

    Track {
        id,
        title,
        artist,
        cover,
        url,
    }
}

/// Scalar field as text; null and structured values count as missing
fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
