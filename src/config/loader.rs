use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::StoreConfig;

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

impl StoreConfig {
    /// Parses and validates configuration from TOML text.
    ///
    /// Reported parse errors use `<inline>` as the path.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<inline>"))
    }

    /// Loads configuration from a TOML file.
    ///
    /// - If the file doesn't exist, returns `StoreConfig::default()`.
    /// - If the file exists, parses it as TOML and validates.
    /// - Returns an error if reading, parsing, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(StoreConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Both capacities are non-zero
    /// - The name is not blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.intake_capacity == 0 {
            return Err(ConfigError::ValidationError {
                message: "intake_capacity must be at least 1".to_string(),
            });
        }

        if self.effect_capacity == 0 {
            return Err(ConfigError::ValidationError {
                message: "effect_capacity must be at least 1".to_string(),
            });
        }

        if self.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "name must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
