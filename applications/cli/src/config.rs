/// Application configuration
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vibewave_catalog::{CatalogConfig, DEFAULT_CATALOG_URL};
use vibewave_playback::{PlaybackConfig, DEFAULT_VOLUME};
use vibewave_storage::DEFAULT_PLAYLISTS_KEY;

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "vibewave.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_url")]
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_playlists_key")]
    pub playlists_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub volume: u8,

    #[serde(default)]
    pub shuffle: bool,

    #[serde(default)]
    pub repeat: bool,

    /// Load the first catalog track (paused) once the catalog arrives
    #[serde(default = "default_autoload")]
    pub autoload_first_track: bool,
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// `path` must exist when given; otherwise `vibewave.toml` is read if
    /// present. Environment variables override both, e.g.
    /// `VIBEWAVE_PLAYBACK__VOLUME=40`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("VIBEWAVE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.catalog.url.trim();
        if url.is_empty() {
            return Err(AppError::Config(
                "catalog.url is required (set VIBEWAVE_CATALOG__URL)".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "catalog.url must be an http(s) URL, got {url:?}"
            )));
        }

        if self.playback.volume > 100 {
            return Err(AppError::Config(format!(
                "playback.volume must be 0-100, got {}",
                self.playback.volume
            )));
        }

        if self.storage.playlists_key.trim().is_empty() {
            return Err(AppError::Config(
                "storage.playlists_key cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            url: self.catalog.url.clone(),
            timeout: Duration::from_secs(self.catalog.timeout_secs),
            ..CatalogConfig::default()
        }
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            volume: self.playback.volume,
            shuffle: self.playback.shuffle,
            repeat: self.playback.repeat,
        }
    }
}

// Default values
fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_playlists_key() -> String {
    DEFAULT_PLAYLISTS_KEY.to_string()
}

fn default_volume() -> u8 {
    DEFAULT_VOLUME
}

fn default_autoload() -> bool {
    true
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            playlists_key: default_playlists_key(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            shuffle: false,
            repeat: false,
            autoload_first_track: default_autoload(),
        }
    }
}
