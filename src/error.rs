//! Error types for Kubekraken.
//!
//! Per-target command failures are never represented here: they are captured
//! as data inside [`TaskResult`](crate::executor::TaskResult). The variants
//! below cover the failures that stop a run: a broken output sink, invalid
//! configuration detected before dispatch, and the final "some targets
//! failed" verdict.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Kubekraken operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Kubekraken.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Run Errors
    // ========================================================================
    /// One or more targets finished with an error.
    #[error("not all clusters were processed successfully ({failed} of {total} failed)")]
    TargetsFailed {
        /// Number of targets whose command failed
        failed: usize,
        /// Number of targets processed
        total: usize,
    },

    /// Writing to the configured output file or directory failed.
    #[error("Failed to write output to '{path}': {source}")]
    OutputWrite {
        /// File or directory that could not be written
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// The worker pool was asked to run with no workers.
    #[error("Invalid worker count {0}: at least one worker is required")]
    InvalidWorkerCount(usize),

    /// An output condition could not be parsed.
    #[error("Invalid output condition '{0}': expected 'contains=<value>' or 'not-contains=<value>'")]
    InvalidCondition(String),

    /// An output format could not be parsed.
    #[error("Invalid output format '{0}': expected one of text, json, yaml")]
    InvalidOutputFormat(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// A filter expression is not a valid regular expression.
    #[error("Invalid filter expression: {0}")]
    Regex(#[from] regex::Error),

    // ========================================================================
    // Kubeconfig Errors
    // ========================================================================
    /// A kubeconfig file could not be read or parsed.
    #[error("Failed to parse kubeconfig file '{path}': {message}")]
    KubeconfigParse {
        /// Path to the kubeconfig file
        path: PathBuf,
        /// Error message
        message: String,
    },

    // ========================================================================
    // IO and Serialization Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new output write error.
    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new kubeconfig parse error.
    pub fn kubeconfig_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::KubeconfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error was raised before any target was dispatched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidWorkerCount(_)
                | Error::InvalidCondition(_)
                | Error::InvalidOutputFormat(_)
                | Error::Config(_)
                | Error::InvalidConfig { .. }
                | Error::Regex(_)
                | Error::KubeconfigParse { .. }
                | Error::TomlParse(_)
        )
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::TargetsFailed { .. } => 2,
            Error::OutputWrite { .. } => 3,
            e if e.is_configuration() => 4,
            _ => 1,
        }
    }
}
