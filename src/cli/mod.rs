//! CLI module for Kubekraken
//!
//! This module provides the command-line interface for Kubekraken,
//! including argument parsing and subcommand handling.

pub mod commands;

use clap::{Parser, Subcommand};
use kubekraken::executor::{OutputCondition, OutputFormat};
use std::path::PathBuf;

/// Kubekraken - run one command against many Kubernetes clusters
///
/// Every context of every selected kubeconfig file becomes a target. The
/// command runs against all targets in parallel and a summary is printed at
/// the end.
#[derive(Parser, Debug, Clone)]
#[command(name = "kubekraken")]
#[command(version)]
#[command(about = "Run kubectl against many clusters in parallel", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Kubeconfig files or directories (comma separated, repeatable)
    #[arg(long = "kubeconfig-files", global = true, value_delimiter = ',', action = clap::ArgAction::Append)]
    pub kubeconfig_files: Vec<String>,

    /// Only read kubeconfig files in directories whose path matches this regex
    #[arg(long, global = true)]
    pub kubeconfig_filter: Option<String>,

    /// Skip kubeconfig files in directories whose path matches this regex
    #[arg(long, global = true)]
    pub kubeconfig_exclude: Option<String>,

    /// Only use the current context of each kubeconfig file
    #[arg(long, global = true)]
    pub use_current_context: bool,

    /// Only use contexts whose name matches this regex
    #[arg(long, global = true)]
    pub context_filter: Option<String>,

    /// Skip contexts whose name matches this regex
    #[arg(long, global = true)]
    pub context_exclude: Option<String>,

    /// Number of concurrent workers
    #[arg(short = 'w', long, global = true)]
    pub workers: Option<usize>,

    /// Save results to a single file
    #[arg(long, global = true, conflicts_with = "output_dir")]
    pub output_file: Option<PathBuf>,

    /// Save results to a directory, one file per target and channel
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Format of saved results (text, json, yaml)
    #[arg(short = 'o', long, global = true)]
    pub output_format: Option<OutputFormat>,

    /// Do not print stdout of successful targets
    #[arg(long, global = true)]
    pub no_stdout: bool,

    /// Do not print stderr of successful targets
    #[arg(long, global = true)]
    pub no_stderr: bool,

    /// Only print stdout matching this condition (contains=<v> or not-contains=<v>, repeatable)
    #[arg(long = "stdout-condition", global = true, action = clap::ArgAction::Append)]
    pub stdout_conditions: Vec<OutputCondition>,

    /// Per-target timeout in seconds (0 disables it)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "KUBEKRAKEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run kubectl against every target
    #[command(alias = "k")]
    Kubectl(commands::kubectl::KubectlArgs),

    /// List the targets that would be used
    #[command(name = "list-contexts")]
    ListContexts(commands::list_contexts::ListContextsArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}
