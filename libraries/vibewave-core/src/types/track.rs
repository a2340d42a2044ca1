/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Catalog track
///
/// Immutable once fetched. Fields the feed left out have already been
/// replaced with placeholders by the catalog, so every field is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier (canonical string form)
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Cover art reference (URL or empty)
    pub cover: String,

    /// Playable media reference (URL or empty)
    pub url: String,
}

impl Track {
    /// Create a track with no cover and no media reference
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            cover: String::new(),
            url: String::new(),
        }
    }

    /// Set the cover art reference
    #[must_use]
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = cover.into();
        self
    }

    /// Set the playable media reference
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Title as shown to the listener (underscores read as spaces)
    pub fn display_title(&self) -> String {
        self.title.replace('_', " ")
    }

    /// Whether the track has a media reference the device can load
    pub fn is_playable(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Case-insensitive substring match on title or artist.
    ///
    /// `query_lower` must already be lowercase.
    pub fn matches(&self, query_lower: &str) -> bool {
        self.title.to_lowercase().contains(query_lower)
            || self.artist.to_lowercase().contains(query_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_title_replaces_underscores() {
        let track = Track::new(1, "Blue_in_Green", "Miles");
        assert_eq!(track.display_title(), "Blue in Green");
    }

    #[test]
    fn playable_requires_url() {
        let track = Track::new(1, "A", "B");
        assert!(!track.is_playable());
        assert!(track.with_url("a.mp3").is_playable());
    }

    #[test]
    fn matches_title_or_artist() {
        let track = Track::new("x", "Summer Nights", "The Cats");
        assert!(track.matches("summer"));
        assert!(track.matches("cats"));
        assert!(!track.matches("winter"));
    }
}
