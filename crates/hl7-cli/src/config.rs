//! YAML configuration file for the `hl7` binary

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Invalid config '{path}': {message}")]
    Parse { path: String, message: String },
}

/// Settings read from `--config`. Command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_level: Option<String>,
    /// Charset label that skips detection
    pub encoding: Option<String>,
    pub workers: Option<usize>,
    /// Treat warnings as failures
    pub strict: bool,
    /// Extra schema files merged over the builtin catalog
    pub schemas: Vec<PathBuf>,
    pub pretty: bool,
}

impl CliConfig {
    /// Parse a configuration document
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML or unknown keys.
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        // An empty document is a valid, empty configuration.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Read and parse a configuration file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its content is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content, &origin)
    }
}
