//! Configuration management for nitflex
//!
//! Handles config file loading/saving and API key resolution.
//! Config is stored at ~/.config/nitflex/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CATALOG_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_AUTH_URL: &str = "http://10.0.2.2:8000/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Environment variable that overrides the configured TMDB key
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: Option<String>,
    /// Catalog API base URL
    pub catalog_base_url: String,
    /// Auth backend base URL
    pub auth_base_url: String,
    /// Language sent with every catalog request
    pub language: String,
    /// Blanket per-request timeout
    pub request_timeout_secs: u64,
    /// Where preferences and the watch-list database live
    pub data_dir: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            catalog_base_url: DEFAULT_CATALOG_URL.to_string(),
            auth_base_url: DEFAULT_AUTH_URL.to_string(),
            language: "en".to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Get config file path (~/.config/nitflex/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nitflex").join("config.toml"))
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    /// Load config from a specific file, or return default if missing or invalid
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{:#}", e), "ignoring config file, using defaults");
                Self::default()
            }
        }
    }

    /// `Ok(None)` when the file does not exist; read and parse errors are returned
    pub fn try_load_from(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(config))
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&path)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// TMDB API key: environment variable first, then the config file
    pub fn api_key(&self) -> Result<String> {
        pick_api_key(std::env::var(API_KEY_ENV).ok(), self.tmdb_api_key.as_deref()).ok_or_else(
            || {
                anyhow::anyhow!(
                    "No TMDB API key: set {} or tmdb_api_key in the config file",
                    API_KEY_ENV
                )
            },
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Data directory (configured, else ~/.local/share/nitflex)
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("nitflex")
        })
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir().join("preferences.toml")
    }

    /// SQLite URL for the watch-list database
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.data_dir().join("watchlist.db").display())
    }
}

fn pick_api_key(env: Option<String>, cached: Option<&str>) -> Option<String> {
    env.filter(|k| !k.trim().is_empty())
        .or_else(|| cached.filter(|k| !k.trim().is_empty()).map(str::to_string))
}
