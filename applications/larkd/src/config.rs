/// Daemon configuration
use crate::error::{DaemonError, Result};
use lark_playback::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, read when present
const DEFAULT_CONFIG_FILE: &str = "lark.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default)]
    pub playback: PlayerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LibrarySettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,

    /// Synchronize the catalog with `music_dir` when serving starts
    #[serde(default)]
    pub scan_on_start: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            music_dir: default_music_dir(),
            scan_on_start: false,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `lark.toml` is read if
    /// present. `LARK__SECTION__KEY` variables override both, e.g.
    /// `LARK__PLAYBACK__POPULAR_LIMIT=20`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        settings = match path {
            Some(path) => settings.add_source(config::File::from(path).required(true)),
            None => settings
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false)),
        };

        settings = settings.add_source(
            config::Environment::with_prefix("LARK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| DaemonError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| DaemonError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.library.database_url.trim().is_empty() {
            return Err(DaemonError::Config("library.database_url is empty".to_string()));
        }

        if self.playback.popular_limit == 0 {
            return Err(DaemonError::Config(
                "playback.popular_limit must be at least 1".to_string(),
            ));
        }

        if self.playback.progress_interval_ms == 0 {
            return Err(DaemonError::Config(
                "playback.progress_interval_ms must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl DaemonConfig {
    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DaemonError::Config(e.to_string()))
    }
}

fn default_database_url() -> String {
    "sqlite://./data/lark.db".to_string()
}

fn default_music_dir() -> PathBuf {
    PathBuf::from("./music")
}
