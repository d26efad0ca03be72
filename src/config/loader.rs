use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::HostConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl HostConfig {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/fragment-host/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("fragment-host").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file yields `HostConfig::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(HostConfig::default());
        }

        Self::load_from(&path)
    }

    /// Reads, parses and validates an explicit config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: HostConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Every timing value is non-zero
    /// - Custom breakpoint tiers form a usable table
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((name, _)) = self
            .timing
            .named_values()
            .into_iter()
            .find(|(_, value)| *value == 0)
        {
            return Err(ConfigError::ValidationError {
                message: format!("timing.{} must be greater than zero", name),
            });
        }

        self.breakpoints
            .table()
            .map_err(|e| ConfigError::ValidationError {
                message: e.to_string(),
            })?;

        Ok(())
    }
}
