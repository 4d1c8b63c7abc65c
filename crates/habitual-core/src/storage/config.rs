//! TOML-based application configuration.
//!
//! Stores engine preferences:
//! - Which reference data the bootstrap pass seeds
//! - Default log filter used when RUST_LOG is unset
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Seeding configuration for the bootstrap pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Seed the default habit category catalog on first run.
    #[serde(default = "default_true")]
    pub categories: bool,
    /// Seed the default priority levels on first run.
    #[serde(default = "default_true")]
    pub priority_levels: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            categories: true,
            priority_levels: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive applied when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("<data_dir>"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save the configuration to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    "habitual=info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_seed_everything() {
        let config = Config::default();
        assert!(config.seed.categories);
        assert!(config.seed.priority_levels);
        assert_eq!(config.logging.filter, "habitual=info");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[seed]\ncategories = false\n").unwrap();
        assert!(!config.seed.categories);
        assert!(config.seed.priority_levels);
        assert_eq!(config.logging.filter, "habitual=info");
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();
        assert_eq!(parsed.seed.categories, config.seed.categories);
        assert_eq!(parsed.logging.filter, config.logging.filter);
    }
}
