use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "DATAFLOW_LAUNCHER_CONFIG";

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

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// `DATAFLOW_LAUNCHER_CONFIG` wins when set. Otherwise uses
    /// `~/.config/dataflow-launcher/config.toml` on Unix/macOS, or the
    /// equivalent via `dirs::config_dir()`, falling back to the current directory.
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("dataflow-launcher").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Both API endpoints are http(s) URLs
    /// - The request timeout is non-zero
    /// - A Python interpreter is named
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, endpoint) in [
            ("dataflow.endpoint", &self.dataflow.endpoint),
            ("dataflow.storage_endpoint", &self.dataflow.storage_endpoint),
        ] {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::ValidationError {
                    message: format!("{} must be an http(s) URL, got '{}'", key, endpoint),
                });
            }
        }

        if self.dataflow.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "dataflow.timeout_seconds must be greater than zero".to_string(),
            });
        }

        if self.python.interpreter.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "python.interpreter must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
