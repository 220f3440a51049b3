//! Configuration System
//!
//! Handles loading configuration from TOML files and environment
//! variables. Every field has a default, so an empty file (or no file at
//! all) yields a working setup.

use crate::index::btree::{IndexConfig, DEFAULT_DEGREE};
use crate::index::cache::DEFAULT_CACHE_CAPACITY;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Index tuning and placement
#[derive(Debug, Clone, Deserialize)]
pub struct IndexSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_degree")]
    pub degree: usize,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("waypoint").to_string_lossy().to_string())
        .unwrap_or_else(|| "./waypoint_data".to_string())
}

fn default_degree() -> usize {
    DEFAULT_DEGREE
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            degree: default_degree(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl IndexSettings {
    /// Tuning knobs in the form the index engine takes
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            degree: self.degree,
            cache_capacity: self.cache_capacity,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Errors from configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config {path}: {error}")]
    Parse { path: PathBuf, error: String },
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("waypoint").join("config.toml")),
            Some(PathBuf::from("./waypoint.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(data_dir) = std::env::var("WAYPOINT_DATA_DIR") {
            self.index.data_dir = data_dir;
        }
        if let Ok(degree) = std::env::var("WAYPOINT_DEGREE") {
            if let Ok(d) = degree.parse() {
                self.index.degree = d;
            }
        }
        if let Ok(level) = std::env::var("WAYPOINT_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}
