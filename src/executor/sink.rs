//! Persistence of task results to an output file or directory.
//!
//! Text and YAML files grow incrementally as tasks finish. JSON cannot be
//! appended as independent fragments, so a JSON file is written once at the
//! end with the full result set and the summary. A directory receives one file
//! per printed channel of each task plus a `summary` file.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use super::summary::RunSummary;
use super::task::TaskResult;
use crate::error::{Error, Result};

/// Serialization format for persisted output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    /// File extension, including the leading dot
    pub fn ext(&self) -> &'static str {
        match self {
            Self::Text => ".txt",
            Self::Json => ".json",
            Self::Yaml => ".yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::InvalidOutputFormat(s.to_string())),
        }
    }
}

/// Where results are persisted, besides the console.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputDestination {
    /// Console only
    #[default]
    None,
    /// A single combined file
    File(PathBuf),
    /// One file per task channel
    Directory(PathBuf),
}

impl OutputDestination {
    /// Human-readable description, `None` for console-only runs
    pub fn describe(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::File(path) => Some(format!("file {}", path.display())),
            Self::Directory(path) => Some(format!("directory {}", path.display())),
        }
    }
}

/// Document written to a JSON output file.
#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a IndexMap<String, TaskResult>,
    summary: &'a RunSummary,
}

/// Writes results to the configured destination.
///
/// The sink is owned by the executor's shared state and is only used while
/// the state lock is held.
#[derive(Debug)]
pub struct OutputSink {
    destination: OutputDestination,
    format: OutputFormat,
    file: Option<File>,
}

impl OutputSink {
    /// Create a sink; nothing is touched on disk until [`prepare`](Self::prepare)
    pub fn new(destination: OutputDestination, format: OutputFormat) -> Self {
        Self {
            destination,
            format,
            file: None,
        }
    }

    /// Configured destination
    pub fn destination(&self) -> &OutputDestination {
        &self.destination
    }

    /// Configured format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Create or truncate the output file, or reset the output directory.
    pub fn prepare(&mut self) -> Result<()> {
        match &self.destination {
            OutputDestination::None => Ok(()),
            OutputDestination::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| Error::output_write(parent, e))?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|e| Error::output_write(path, e))?;
                self.file = Some(file);
                Ok(())
            }
            OutputDestination::Directory(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "Removing existing output directory");
                    fs::remove_dir_all(path).map_err(|e| Error::output_write(path, e))?;
                }
                fs::create_dir_all(path).map_err(|e| Error::output_write(path, e))
            }
        }
    }

    /// Persist one finished task.
    pub fn record_task(&mut self, result: &TaskResult, total: usize) -> Result<()> {
        match self.destination.clone() {
            OutputDestination::None => Ok(()),
            OutputDestination::File(path) => match self.format {
                OutputFormat::Text => self.append(&path, &result.to_text(total)),
                OutputFormat::Yaml => {
                    let document = result.to_yaml_document()?;
                    self.append(&path, &document)
                }
                OutputFormat::Json => Ok(()),
            },
            OutputDestination::Directory(dir) => {
                let id = &result.target.id;
                let channels = [
                    ("err", result.print_error, &result.error, result.error.as_bytes()),
                    ("stdout", result.print_stdout, &result.stdout, &result.raw_stdout[..]),
                    ("stderr", result.print_stderr, &result.stderr, &result.raw_stderr[..]),
                ];

                for (channel, print, content, raw) in channels {
                    if !print {
                        continue;
                    }
                    let path = dir.join(format!("{}.{}{}", id, channel, self.format.ext()));
                    match self.format {
                        OutputFormat::Text => write_file(&path, raw)?,
                        _ => write_file(&path, self.encode_str(content)?)?,
                    }
                }
                Ok(())
            }
        }
    }

    /// Persist the summary once the pool has drained.
    pub fn finish(
        &mut self,
        results: &IndexMap<String, TaskResult>,
        summary: &RunSummary,
    ) -> Result<()> {
        match self.destination.clone() {
            OutputDestination::None => Ok(()),
            OutputDestination::File(path) => match self.format {
                OutputFormat::Text => {
                    self.append(&path, &format!("---\n{}", summary.to_text()))?;
                    self.close(&path)
                }
                OutputFormat::Yaml => {
                    let yaml = serde_yaml::to_string(summary)?;
                    self.append(&path, &format!("---\n{}", yaml))?;
                    self.close(&path)
                }
                OutputFormat::Json => {
                    self.file = None;
                    let report = JsonReport { results, summary };
                    write_file(&path, &serde_json::to_string_pretty(&report)?)
                }
            },
            OutputDestination::Directory(dir) => {
                let path = dir.join(format!("summary{}", self.format.ext()));
                let body = match self.format {
                    OutputFormat::Text => summary.to_text(),
                    OutputFormat::Json => serde_json::to_string_pretty(summary)?,
                    OutputFormat::Yaml => serde_yaml::to_string(summary)?,
                };
                write_file(&path, &body)
            }
        }
    }

    /// Encode a structured-format string value.
    fn encode_str(&self, content: &str) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Text => content.to_string(),
            OutputFormat::Json => serde_json::to_string(content)?,
            OutputFormat::Yaml => serde_yaml::to_string(content)?,
        })
    }

    fn append(&mut self, path: &Path, content: &str) -> Result<()> {
        if content.is_empty() {
            return Ok(());
        }
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => {
                return Err(Error::output_write(
                    path,
                    std::io::Error::other("output file was not prepared"),
                ))
            }
        };
        file.write_all(content.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| Error::output_write(path, e))
    }

    fn close(&mut self, path: &Path) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|e| Error::output_write(path, e))?;
        }
        Ok(())
    }
}

fn write_file(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::output_write(path, e))
}
