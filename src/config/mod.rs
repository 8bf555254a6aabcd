//! Configuration loading and management

mod io;

pub use io::write_config_file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::progress::EngineSettings;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[engine]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Key of the progress row (one per user)
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Seconds an event mood (excited, determined, ...) stays before
    /// reverting to the recency mood
    #[serde(default = "default_mood_transient_secs")]
    pub mood_transient_secs: u64,
}

fn default_user_id() -> String {
    "default".to_string()
}

fn default_mood_transient_secs() -> u64 {
    4
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            mood_transient_secs: default_mood_transient_secs(),
        }
    }
}

/// `[storage]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path (defaults to ~/.grove/grove.db)
    #[serde(default)]
    pub database: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from `path` if given, else from the global config file.
    ///
    /// A missing global file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let global = Self::global_config_path();
                if global.exists() {
                    Self::from_file(&global)
                } else {
                    tracing::debug!("No config at {}, using defaults", global.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Database path, resolved against the global config directory
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("grove.db"))
    }

    /// Settings handed to the engine
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            user_id: self.engine.user_id.clone(),
            mood_transient: Duration::from_secs(self.engine.mood_transient_secs),
        }
    }
}
