//! Configuration module for Kubekraken
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/kubekraken/config.toml)
//! - User configuration (~/.kubekraken.toml)
//! - Project configuration (./kubekraken.toml)
//! - Environment variables
//!
//! Command-line arguments are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::executor::{OutputFormat, DEFAULT_COMMAND, DEFAULT_WORKERS};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default run settings
    pub defaults: Defaults,

    /// Colors and output settings
    pub colors: ColorsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Default run settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Number of concurrent workers
    pub workers: usize,

    /// Command run against every target
    pub command: String,

    /// Per-target timeout in seconds, 0 disables it
    pub timeout: u64,

    /// Format of persisted results (text, json, yaml)
    pub output_format: String,

    /// Kubeconfig files or directories to read targets from
    pub kubeconfig_files: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            command: DEFAULT_COMMAND.to_string(),
            timeout: 0,
            output_format: "text".to_string(),
            kubeconfig_files: Vec::new(),
        }
    }
}

/// Colors and output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colors
    pub enabled: bool,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// One configuration file, where only keys present in the file are set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    defaults: DefaultsLayer,
    colors: ColorsLayer,
    logging: LoggingLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DefaultsLayer {
    workers: Option<usize>,
    command: Option<String>,
    timeout: Option<u64>,
    output_format: Option<String>,
    kubeconfig_files: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ColorsLayer {
    enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LoggingLayer {
    log_level: Option<String>,
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                debug!(path = %path.display(), "Loading configuration file");
                config = config.merge_from_file(&path)?;
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Get the list of configuration file paths to check
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Explicit path takes priority
        if let Some(path) = explicit_path {
            paths.push(path.clone());
            return paths;
        }

        paths.push(PathBuf::from("/etc/kubekraken/config.toml"));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".kubekraken.toml"));
            paths.push(home.join(".kubekraken/config.toml"));
        }

        paths.push(PathBuf::from("kubekraken.toml"));

        if let Ok(env_config) = std::env::var("KUBEKRAKEN_CONFIG") {
            paths.insert(0, PathBuf::from(env_config));
        }

        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let layer: ConfigLayer = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => toml::from_str(&content)
                .or_else(|_| serde_yaml::from_str(&content))
                .map_err(|e| {
                    Error::Config(format!(
                        "Failed to parse config file {}: {}",
                        path.display(),
                        e
                    ))
                })?,
        };

        Ok(self.merge(layer))
    }

    /// Merge a file layer into this config, keys present in the layer win
    fn merge(&self, layer: ConfigLayer) -> Config {
        let mut merged = self.clone();
        let ConfigLayer {
            defaults,
            colors,
            logging,
        } = layer;

        if let Some(workers) = defaults.workers {
            merged.defaults.workers = workers;
        }
        if let Some(command) = defaults.command {
            merged.defaults.command = command;
        }
        if let Some(timeout) = defaults.timeout {
            merged.defaults.timeout = timeout;
        }
        if let Some(output_format) = defaults.output_format {
            merged.defaults.output_format = output_format;
        }
        if let Some(kubeconfig_files) = defaults.kubeconfig_files {
            merged.defaults.kubeconfig_files = kubeconfig_files;
        }
        if let Some(enabled) = colors.enabled {
            merged.colors.enabled = enabled;
        }
        if let Some(log_level) = logging.log_level {
            merged.logging.log_level = log_level;
        }

        merged
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(workers) = std::env::var("KUBEKRAKEN_WORKERS") {
            match workers.parse() {
                Ok(n) => self.defaults.workers = n,
                Err(_) => warn!(value = %workers, "Ignoring invalid KUBEKRAKEN_WORKERS"),
            }
        }

        if let Ok(timeout) = std::env::var("KUBEKRAKEN_TIMEOUT") {
            match timeout.parse() {
                Ok(n) => self.defaults.timeout = n,
                Err(_) => warn!(value = %timeout, "Ignoring invalid KUBEKRAKEN_TIMEOUT"),
            }
        }

        if let Ok(command) = std::env::var("KUBEKRAKEN_COMMAND") {
            self.defaults.command = command;
        }

        if let Ok(format) = std::env::var("KUBEKRAKEN_OUTPUT_FORMAT") {
            self.defaults.output_format = format;
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() || std::env::var("KUBEKRAKEN_NO_COLOR").is_ok() {
            self.colors.enabled = false;
        }
    }

    /// Reject values that would make a run impossible
    pub fn validate(&self) -> Result<()> {
        if self.defaults.workers == 0 {
            return Err(Error::InvalidConfig {
                key: "defaults.workers".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.defaults.command.trim().is_empty() {
            return Err(Error::InvalidConfig {
                key: "defaults.command".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        self.output_format()?;
        Ok(())
    }

    /// Parsed output format
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.defaults.output_format.parse()
    }

    /// Load from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Config::default().merge_from_file(path.as_ref())
    }
}
