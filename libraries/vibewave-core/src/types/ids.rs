/// ID types for VibeWave entities
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Canonical track identifier
///
/// Catalog feeds and persisted playlists may carry a track id as a JSON
/// number or a JSON string. Both forms funnel through the same
/// canonicalisation so `42`, `42.0` and `"42"` are the same track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a track ID from an already-textual identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Canonicalise a JSON value into a track ID.
    ///
    /// Strings and numbers are accepted; anything else (null, bool, arrays,
    /// objects) has no identifier form and yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::from(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Self::from(u))
                } else {
                    n.as_f64().map(Self::from)
                }
            }
            _ => None,
        }
    }

    /// The canonical numeric form of a textual id (`"42.0"` → `42`), if
    /// the text reads as a number and differs from it
    pub fn numeric_form(&self) -> Option<Self> {
        let value = serde_json::from_str::<Value>(self.0.trim()).ok()?;
        if !value.is_number() {
            return None;
        }
        Self::from_json(&value).filter(|id| id != self)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the ID and return the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Decimal form of a float id, matching how the catalog feed's producer
/// prints numbers: integral values lose the fraction.
fn canonical_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TrackId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for TrackId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

impl From<&TrackId> for TrackId {
    fn from(id: &TrackId) -> Self {
        id.clone()
    }
}

impl From<i32> for TrackId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for TrackId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for TrackId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for TrackId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<f64> for TrackId {
    fn from(id: f64) -> Self {
        Self(canonical_float(id))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl<'de> Deserialize<'de> for TrackId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(i) => Self::from(i),
            RawId::Unsigned(u) => Self::from(u),
            RawId::Float(f) => Self::from(f),
        })
    }
}

/// Playlist identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(String);

impl PlaylistId {
    /// Create a new playlist ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Time-based ID: milliseconds since the Unix epoch, in decimal
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlaylistId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlaylistId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_and_textual_ids_are_equal() {
        assert_eq!(TrackId::from(42), TrackId::from("42"));
        assert_eq!(TrackId::from(42_u64), TrackId::from("42"));
        assert_eq!(TrackId::from(42.0), TrackId::from("42"));
    }

    #[test]
    fn fractional_float_keeps_fraction() {
        assert_eq!(TrackId::from(1.5).as_str(), "1.5");
    }

    #[test]
    fn from_json_accepts_strings_and_numbers() {
        assert_eq!(TrackId::from_json(&json!(1)), Some(TrackId::from("1")));
        assert_eq!(TrackId::from_json(&json!("a-1")), Some(TrackId::from("a-1")));
        assert_eq!(TrackId::from_json(&json!(null)), None);
        assert_eq!(TrackId::from_json(&json!(true)), None);
    }

    #[test]
    fn numeric_form_of_typed_ids() {
        assert_eq!(TrackId::new("1.0").numeric_form(), Some(TrackId::from(1)));
        assert_eq!(TrackId::new("1e2").numeric_form(), Some(TrackId::from(100)));
        assert_eq!(TrackId::new("7").numeric_form(), None);
        assert_eq!(TrackId::new("song-3").numeric_form(), None);
        assert_eq!(TrackId::new("\"7\"").numeric_form(), None);
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let ids: Vec<TrackId> = serde_json::from_str(r#"[1, "2", 3.0, -4]"#).unwrap();
        let ids: Vec<&str> = ids.iter().map(TrackId::as_str).collect();
        assert_eq!(ids, vec!["1", "2", "3", "-4"]);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&TrackId::from(9)).unwrap();
        assert_eq!(json, r#""9""#);
    }

    #[test]
    fn playlist_id_from_millis() {
        assert_eq!(PlaylistId::from_millis(1_700_000_000_000).as_str(), "1700000000000");
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn integers_match_their_decimal_text(n in any::<i64>()) {
            prop_assert_eq!(TrackId::from(n), TrackId::from(n.to_string()));
        }

        #[test]
        fn integral_floats_match_integers(n in -1_000_000_000i64..1_000_000_000) {
            prop_assert_eq!(TrackId::from(n as f64), TrackId::from(n));
        }

        #[test]
        fn json_numbers_and_strings_agree(n in any::<u32>()) {
            let from_number = TrackId::from_json(&serde_json::json!(n));
            let from_text = TrackId::from_json(&serde_json::json!(n.to_string()));
            prop_assert_eq!(from_number, from_text);
        }
    }
}
