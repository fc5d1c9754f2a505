//! Subcommands module for Kubekraken CLI
//!
//! This module contains all the subcommand implementations.

pub mod kubectl;
pub mod list_contexts;

use anyhow::Result;
use kubekraken::config::Config;
use kubekraken::executor::{
    ExecutorConfig, OutputDestination, OutputFormat, PrintPolicy, Target,
};
use kubekraken::inventory::{default_kubeconfig_paths, discover_all, TargetFilter};
use tracing::{debug, warn};

use crate::cli::Cli;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration, with environment overrides applied
    pub config: Config,
    /// Kubeconfig files or directories to read
    pub kubeconfig_files: Vec<String>,
    /// Kubeconfig and context selection
    pub filter: TargetFilter,
    /// Number of concurrent workers
    pub workers: usize,
    /// Per-target timeout in seconds, 0 disables it
    pub timeout: u64,
    /// Where results are saved
    pub destination: OutputDestination,
    /// Format of saved results
    pub output_format: OutputFormat,
    /// Printing switches and stdout conditions
    pub print: PrintPolicy,
    /// Whether colors may be used
    pub color: bool,
    /// Verbosity level
    pub verbosity: u8,
}

impl CommandContext {
    /// Resolve command-line arguments on top of the configuration.
    ///
    /// Filter expressions and formats are validated here, before any target
    /// is touched.
    pub fn new(cli: &Cli, config: Config) -> Result<Self> {
        let filter = TargetFilter::new(
            cli.kubeconfig_filter.as_deref(),
            cli.kubeconfig_exclude.as_deref(),
            cli.use_current_context,
            cli.context_filter.as_deref(),
            cli.context_exclude.as_deref(),
        )?;

        let kubeconfig_files = if !cli.kubeconfig_files.is_empty() {
            cli.kubeconfig_files.clone()
        } else if !config.defaults.kubeconfig_files.is_empty() {
            config.defaults.kubeconfig_files.clone()
        } else {
            default_kubeconfig_paths()
        };

        let destination = match (&cli.output_file, &cli.output_dir) {
            (Some(file), _) => OutputDestination::File(file.clone()),
            (None, Some(dir)) => OutputDestination::Directory(dir.clone()),
            (None, None) => OutputDestination::None,
        };

        let output_format = match cli.output_format {
            Some(format) => format,
            None => config.output_format()?,
        };

        let print = PrintPolicy {
            print_stdout: !cli.no_stdout,
            print_stderr: !cli.no_stderr,
            conditions: cli.stdout_conditions.clone(),
        };

        Ok(Self {
            kubeconfig_files,
            filter,
            workers: cli.workers.unwrap_or(config.defaults.workers),
            timeout: cli.timeout.unwrap_or(config.defaults.timeout),
            destination,
            output_format,
            print,
            color: !cli.no_color && config.colors.enabled,
            verbosity: cli.verbosity(),
            config,
        })
    }

    /// Discover targets from every configured kubeconfig path
    pub fn discover_targets(&self) -> Result<Vec<Target>> {
        debug!(paths = ?self.kubeconfig_files, "Discovering targets");
        let targets = discover_all(&self.kubeconfig_files, &self.filter)?;
        if targets.is_empty() {
            warn!("No contexts matched the given filters");
        }
        Ok(targets)
    }

    /// Executor configuration for running `args` against every target
    pub fn executor_config(&self, args: Vec<String>) -> ExecutorConfig {
        ExecutorConfig {
            workers: self.workers,
            command: self.config.defaults.command.clone(),
            args,
            destination: self.destination.clone(),
            format: self.output_format,
            print: self.print.clone(),
        }
    }
}
