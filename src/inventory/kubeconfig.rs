//! Kubeconfig file parsing and context selection.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::executor::Target;

/// The parts of a kubeconfig file needed to enumerate contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Kubeconfig {
    #[serde(default)]
    pub current_context: String,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
}

/// A named entry of the `contexts` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    #[serde(default)]
    pub context: ContextDetails,
}

/// Cluster and user a context points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDetails {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Kubeconfig {
    /// Parse kubeconfig YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Which kubeconfig files and contexts become targets.
#[derive(Debug, Clone, Default)]
pub struct TargetFilter {
    /// Kubeconfig paths inside a directory must match this
    pub kubeconfig_filter: Option<Regex>,
    /// Kubeconfig paths inside a directory must not match this
    pub kubeconfig_exclude: Option<Regex>,
    /// Only keep the current context of each file
    pub use_current_context: bool,
    /// Context names must match this
    pub context_filter: Option<Regex>,
    /// Context names must not match this
    pub context_exclude: Option<Regex>,
}

fn compile(pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern.filter(|p| !p.is_empty()) {
        Some(pattern) => Ok(Some(Regex::new(pattern)?)),
        None => Ok(None),
    }
}

impl TargetFilter {
    /// Compile the filter expressions; empty patterns are ignored.
    pub fn new(
        kubeconfig_filter: Option<&str>,
        kubeconfig_exclude: Option<&str>,
        use_current_context: bool,
        context_filter: Option<&str>,
        context_exclude: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            kubeconfig_filter: compile(kubeconfig_filter)?,
            kubeconfig_exclude: compile(kubeconfig_exclude)?,
            use_current_context,
            context_filter: compile(context_filter)?,
            context_exclude: compile(context_exclude)?,
        })
    }

    /// Whether a kubeconfig file found in a directory should be parsed
    pub fn accepts_kubeconfig(&self, path: &str) -> bool {
        if let Some(filter) = &self.kubeconfig_filter {
            if !filter.is_match(path) {
                return false;
            }
        }
        if let Some(exclude) = &self.kubeconfig_exclude {
            if exclude.is_match(path) {
                return false;
            }
        }
        true
    }

    /// Whether a context of a kubeconfig should become a target
    pub fn accepts_context(&self, name: &str, current_context: &str) -> bool {
        if self.use_current_context && name != current_context {
            return false;
        }
        if let Some(filter) = &self.context_filter {
            if !filter.is_match(name) {
                return false;
            }
        }
        if let Some(exclude) = &self.context_exclude {
            if exclude.is_match(name) {
                return false;
            }
        }
        true
    }
}

/// Targets for every accepted context of one kubeconfig file.
pub fn parse_kubeconfig_file(path: &Path, filter: &TargetFilter) -> Result<Vec<Target>> {
    info!(path = %path.display(), "Parsing kubeconfig file");

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::kubeconfig_parse(path, format!("failed to read file: {}", e)))?;
    let kubeconfig = Kubeconfig::from_yaml(&content)
        .map_err(|e| Error::kubeconfig_parse(path, e.to_string()))?;

    let kubeconfig_path = path.display().to_string();
    let mut targets = Vec::new();

    for context in &kubeconfig.contexts {
        if !filter.accepts_context(&context.name, &kubeconfig.current_context) {
            debug!(path = %kubeconfig_path, context = %context.name, "Skipping context");
            continue;
        }

        debug!(path = %kubeconfig_path, context = %context.name, "Found matching context");
        targets.push(Target::new(kubeconfig_path.as_str(), context.name.as_str()));
    }

    Ok(targets)
}

/// Targets from a kubeconfig file, or from every file of a directory.
///
/// A leading `~` is expanded. A missing path yields no targets. Directories
/// are read non-recursively in name order.
pub fn discover_targets(path: &str, filter: &TargetFilter) -> Result<Vec<Target>> {
    let expanded = PathBuf::from(shellexpand::tilde(path).as_ref());

    if !expanded.exists() {
        warn!(path = %expanded.display(), "Kubeconfig file does not exist");
        return Ok(Vec::new());
    }

    if !expanded.is_dir() {
        return parse_kubeconfig_file(&expanded, filter);
    }

    info!(path = %expanded.display(), "Parsing kubeconfig directory");

    let mut files = Vec::new();
    for entry in std::fs::read_dir(&expanded)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();

    let mut targets = Vec::new();
    for file in files {
        if !filter.accepts_kubeconfig(&file.display().to_string()) {
            debug!(path = %file.display(), "Skipping kubeconfig file");
            continue;
        }
        targets.extend(parse_kubeconfig_file(&file, filter)?);
    }

    Ok(targets)
}

/// Targets from every path, in order.
pub fn discover_all<S: AsRef<str>>(paths: &[S], filter: &TargetFilter) -> Result<Vec<Target>> {
    let mut targets = Vec::new();
    for path in paths {
        targets.extend(discover_targets(path.as_ref(), filter)?);
    }
    Ok(targets)
}

/// Kubeconfig paths used when none are configured: `$KUBECONFIG`, split on
/// the platform path separator, else `~/.kube/config`.
pub fn default_kubeconfig_paths() -> Vec<String> {
    if let Some(value) = std::env::var_os("KUBECONFIG").filter(|v| !v.is_empty()) {
        return std::env::split_paths(&value)
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.display().to_string())
            .collect();
    }

    dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .map(|path| vec![path.display().to_string()])
        .unwrap_or_else(|| vec!["~/.kube/config".to_string()])
}
