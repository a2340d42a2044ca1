//! Song catalog client.

use crate::error::{CatalogError, Result};
use crate::mapping::parse_catalog;
use reqwest::Client;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vibewave_core::{Track, TrackId, TrackResolver};

/// Public songs feed used when nothing else is configured
pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/mrtariq00/api-s/refs/heads/main/songsApi.json";

/// Catalog connection settings
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Feed URL (http or https)
    pub url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl CatalogConfig {
    /// Settings for `url` with default timeouts
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Read-only song catalog, fetched once per session.
///
/// The first successful fetch is kept for the lifetime of the value.
/// Concurrent first calls share one request. A failed fetch is not kept,
/// so calling again retries.
///
/// # Example
///
/// ```ignore
/// use vibewave_catalog::{CatalogConfig, SongCatalog};
///
/// let catalog = SongCatalog::new(CatalogConfig::default())?;
/// let tracks = catalog.fetch_all().await;
/// println!("{} tracks", tracks.len());
///
/// for track in catalog.search("night") {
///     println!("{} - {}", track.display_title(), track.artist);
/// }
/// ```
pub struct SongCatalog {
    http: Client,
    url: String,
    tracks: OnceLock<Vec<Track>>,
    fetch_lock: Mutex<()>,
}

impl SongCatalog {
    /// Create a catalog client. No request is made until the first fetch.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim().to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CatalogError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("VibeWave/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CatalogError::Request)?;

        Ok(Self {
            http,
            url,
            tracks: OnceLock::new(),
            fetch_lock: Mutex::new(()),
        })
    }

    /// Catalog that is already loaded with `tracks`. Fetches return them
    /// without touching the network.
    pub fn preloaded(tracks: Vec<Track>) -> Self {
        Self {
            http: Client::new(),
            url: String::new(),
            tracks: OnceLock::from(tracks),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Feed URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether a fetch has succeeded
    pub fn is_loaded(&self) -> bool {
        self.tracks.get().is_some()
    }

    /// Fetch the catalog, or return the cached copy.
    pub async fn try_fetch_all(&self) -> Result<&[Track]> {
        if let Some(tracks) = self.tracks.get() {
            return Ok(tracks.as_slice());
        }

        let _guard = self.fetch_lock.lock().await;
        // Another caller may have finished while we waited.
        if let Some(tracks) = self.tracks.get() {
            return Ok(tracks.as_slice());
        }

        let tracks = self.request().await?;
        info!(count = tracks.len(), url = %self.url, "Song catalog loaded");
        Ok(self.tracks.get_or_init(|| tracks).as_slice())
    }

    /// Fetch the catalog; a failure is logged and yields an empty catalog.
    pub async fn fetch_all(&self) -> &[Track] {
        match self.try_fetch_all().await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(url = %self.url, error = %e, "Could not fetch songs, catalog is empty");
                &[]
            }
        }
    }

    /// Loaded tracks, empty before the first successful fetch
    pub fn tracks(&self) -> &[Track] {
        self.tracks.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// Look up a track by id. Numeric and string ids compare equal.
    pub fn get_by_id(&self, id: impl Into<TrackId>) -> Option<&Track> {
        let id = id.into();
        self.tracks().iter().find(|track| track.id == id)
    }

    /// Tracks whose title or artist contains `query`, case-insensitive.
    /// An empty query matches every track.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Track> + 'a {
        let needle = query.trim().to_lowercase();
        self.tracks()
            .iter()
            .filter(move |track| needle.is_empty() || track.matches(&needle))
    }

    async fn request(&self) -> Result<Vec<Track>> {
        debug!(url = %self.url, "Fetching song catalog");

        let response = self.http.get(&self.url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                CatalogError::ServerUnreachable(e.to_string())
            } else {
                CatalogError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(format!("Failed to decode catalog: {}", e)))?;

        parse_catalog(body)
    }
}

impl TrackResolver for SongCatalog {
    fn resolve(&self, id: &TrackId) -> Option<Track> {
        self.tracks().iter().find(|track| &track.id == id).cloned()
    }

    fn track_ids(&self) -> Vec<TrackId> {
        self.tracks().iter().map(|track| track.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SongCatalog {
        SongCatalog::preloaded(vec![
            Track::new(1, "Sunrise", "Aurora").with_url("sunrise.mp3"),
            Track::new(2, "Moon_Walk", "Night Owls").with_url("moon.mp3"),
            Track::new("x", "Rain", "aurora").with_url("rain.mp3"),
        ])
    }

    #[test]
    fn get_by_id_accepts_numbers() {
        let catalog = sample();
        assert_eq!(catalog.get_by_id(2).map(|t| t.title.as_str()), Some("Moon_Walk"));
        assert_eq!(catalog.get_by_id("2").map(|t| t.title.as_str()), Some("Moon_Walk"));
        assert!(catalog.get_by_id(3).is_none());
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_artist() {
        let catalog = sample();
        let hits: Vec<&str> = catalog.search("AURORA").map(|t| t.id.as_str()).collect();
        assert_eq!(hits, vec!["1", "x"]);

        let hits: Vec<&str> = catalog.search("moon").map(|t| t.id.as_str()).collect();
        assert_eq!(hits, vec!["2"]);
    }

    #[test]
    fn empty_query_lists_everything() {
        assert_eq!(sample().search("  ").count(), 3);
    }

    #[test]
    fn rejects_urls_without_scheme() {
        assert!(matches!(
            SongCatalog::new(CatalogConfig::new("")),
            Err(CatalogError::InvalidUrl(_))
        ));
        assert!(matches!(
            SongCatalog::new(CatalogConfig::new("ftp://songs")),
            Err(CatalogError::InvalidUrl(_))
        ));
    }

    #[test]
    fn preloaded_catalog_is_loaded() {
        assert!(sample().is_loaded());
        assert_eq!(sample().track_ids().len(), 3);
    }
}
