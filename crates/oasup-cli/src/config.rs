//! Configuration management for the CLI
//!
//! This module handles loading the optional tool configuration file:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Command-line arguments, merged in [`Cli::run_config`](crate::cli::Cli::run_config)

use crate::error::{Error, Result};
use oasup_core::HttpOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Remote source settings
    pub http: HttpConfig,

    /// Lint settings
    pub lint: LintConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored diagnostics when stderr is a terminal
    pub color: bool,
}

/// Transport configuration for remote sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent override
    pub user_agent: Option<String>,
}

/// Lint configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Rule names to skip, in addition to `--lintSkip`
    pub skip: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); derived from verbosity when unset
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: HttpOptions::default().timeout_secs,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Transport options for the source loader
    pub fn to_options(&self) -> HttpOptions {
        let defaults = HttpOptions::default();
        HttpOptions {
            timeout_secs: self.timeout_secs,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}

/// A configuration file that exists but could not be loaded
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: Error,
}

impl SkippedFile {
    /// Log the skip; call once logging is initialized
    pub fn report(&self) {
        warn!(path = %self.path.display(), error = %self.error, "skipping configuration file");
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// The first readable file wins. Files that fail to load are skipped
    /// and returned so the caller can warn about them.
    pub fn load() -> (Self, Vec<SkippedFile>) {
        Self::load_from(&Self::default_config_paths())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<(Self, Vec<SkippedFile>)> {
        match file {
            Some(path) => Ok((Self::from_file(path)?, Vec::new())),
            None => Ok(Self::load()),
        }
    }

    fn load_from(paths: &[PathBuf]) -> (Self, Vec<SkippedFile>) {
        let mut skipped = Vec::new();
        for path in paths.iter().filter(|p| p.exists()) {
            match Self::from_file(path) {
                Ok(config) => return (config, skipped),
                Err(error) => skipped.push(SkippedFile {
                    path: path.clone(),
                    error,
                }),
            }
        }
        (Self::default(), skipped)
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".oasup.yaml"), PathBuf::from(".oasup.json")];

        if let Some(config_dir) = dirs::config_dir() {
            let oasup_dir = config_dir.join("oasup");
            paths.push(oasup_dir.join("config.yaml"));
            paths.push(oasup_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".oasup.yaml"));
            paths.push(home_dir.join(".oasup.json"));
        }

        paths
    }
}
