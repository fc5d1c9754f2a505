//! Task execution engine for Kubekraken
//!
//! This module fans one command out across many targets:
//! - [`dispatcher`]: bounded worker pool fed by a hand-off queue
//! - [`TaskProcessor`]: runs the command for one target and reports it
//! - [`condition`]: contains / not-contains filters over stdout
//! - [`sink`]: persistence to an output file or directory
//! - [`summary`]: classification of all results once the pool drains
//!
//! Command invocations run fully in parallel. Everything that touches shared
//! state (the console, the output sink and the result map) happens under one
//! lock, so report blocks of different targets never interleave.

pub mod condition;
pub mod dispatcher;
pub mod runner;
pub mod sink;
pub mod summary;
pub mod target;
pub mod task;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, info};

pub use condition::{matches, ConditionOperator, OutputCondition};
pub use dispatcher::{dispatch, TargetProcessor};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
pub use sink::{OutputDestination, OutputFormat, OutputSink};
pub use summary::RunSummary;
pub use target::{target_id, Target};
pub use task::{PrintDecision, PrintPolicy, TaskResult};

use crate::error::{Error, Result};
use crate::output::{styler_for, SharedStyler, Style, StyledText, Styler};

/// Default size of the worker pool
pub const DEFAULT_WORKERS: usize = 10;

/// Default command run against every target
pub const DEFAULT_COMMAND: &str = "kubectl";

/// Configuration for one run of the executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Number of concurrent workers, must be at least 1
    pub workers: usize,
    /// Program to run
    pub command: String,
    /// Arguments appended after the target selection arguments
    pub args: Vec<String>,
    /// Where results are persisted
    pub destination: OutputDestination,
    /// Format of persisted results
    pub format: OutputFormat,
    /// Printing switches and stdout conditions
    pub print: PrintPolicy,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            command: DEFAULT_COMMAND.to_string(),
            args: Vec::new(),
            destination: OutputDestination::None,
            format: OutputFormat::Text,
            print: PrintPolicy::default(),
        }
    }
}

/// Console writer shared by all workers
pub type Console = Box<dyn Write + Send>;

/// State mutated by workers, always behind a single lock.
struct RunState {
    results: IndexMap<String, TaskResult>,
    sink: OutputSink,
    console: Console,
    /// Set once reporting failed, later tasks are neither run nor reported
    failed: bool,
}

impl RunState {
    /// Print and persist one finished task, then store it.
    fn report(&mut self, result: TaskResult, total: usize, styler: &dyn Styler) -> Result<()> {
        write_lines(&mut self.console, &result.to_styled_text(total), styler)?;
        self.sink.record_task(&result, total)?;
        self.results.insert(result.target.id.clone(), result);
        Ok(())
    }
}

fn write_lines(console: &mut Console, lines: &[StyledText], styler: &dyn Styler) -> io::Result<()> {
    for line in lines {
        writeln!(console, "{}", line.render(styler))?;
    }
    console.flush()
}

/// Runs the command for one target and reports the outcome.
pub struct TaskProcessor {
    command: String,
    args: Vec<String>,
    policy: PrintPolicy,
    total: usize,
    runner: Arc<dyn CommandRunner>,
    styler: SharedStyler,
    state: Arc<Mutex<RunState>>,
}

impl TaskProcessor {
    /// Full argument list for a target
    fn command_args(&self, target: &Target) -> Vec<String> {
        target
            .command_args()
            .iter()
            .map(|arg| arg.to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl TargetProcessor for TaskProcessor {
    async fn process(&self, target: Target) -> Result<()> {
        let failed = self.state.lock().failed;
        if failed {
            debug!(target = %target.id, "Skipping target after fatal error");
            return Ok(());
        }

        let args = self.command_args(&target);
        let output = self.runner.run(&self.command, &args).await;
        let result = TaskResult::new(target, output, &self.policy);

        if result.has_error {
            debug!(target = %result.target.id, error = %result.error, "Command failed");
        }

        let mut state = self.state.lock();
        if state.failed {
            return Ok(());
        }
        let reported = state.report(result, self.total, self.styler.as_ref());
        if reported.is_err() {
            state.failed = true;
        }
        reported
    }
}

/// Fans a command out across targets and summarizes the results.
pub struct Executor {
    config: ExecutorConfig,
    runner: Arc<dyn CommandRunner>,
    styler: SharedStyler,
    console: Console,
}

impl Executor {
    /// Create an executor running local processes and printing to stdout
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            runner: Arc::new(ProcessRunner::new()),
            styler: styler_for(true),
            console: Box::new(io::stdout()),
        }
    }

    /// Use a different command runner
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Use a different styler
    pub fn with_styler(mut self, styler: SharedStyler) -> Self {
        self.styler = styler;
        self
    }

    /// Write console output somewhere other than stdout
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Configuration of this executor
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run the command against every target.
    ///
    /// Per-target failures are part of the returned summary; an `Err` means
    /// the run itself could not be completed (invalid configuration or a
    /// broken output sink).
    pub async fn run(self, targets: Vec<Target>) -> Result<RunSummary> {
        let Self {
            config,
            runner,
            styler,
            console,
        } = self;

        if config.workers == 0 {
            return Err(Error::InvalidWorkerCount(config.workers));
        }

        let destination = config.destination.clone();
        let mut sink = OutputSink::new(destination.clone(), config.format);
        sink.prepare()?;
        if let Some(location) = destination.describe() {
            info!(destination = %location, format = %config.format, "Saving results");
        }

        let total = targets.len();
        info!(command = %config.command, targets = total, "Dispatching command");

        let state = Arc::new(Mutex::new(RunState {
            results: IndexMap::with_capacity(total),
            sink,
            console,
            failed: false,
        }));

        let processor = Arc::new(TaskProcessor {
            command: config.command.clone(),
            args: config.args.clone(),
            policy: config.print.clone(),
            total,
            runner,
            styler: Arc::clone(&styler),
            state: Arc::clone(&state),
        });

        dispatch(targets, config.workers, processor).await?;

        let mut state = state.lock();
        let results = std::mem::take(&mut state.results);
        let summary = RunSummary::from_results(&results);

        let mut lines = vec![
            StyledText::new("\n", Style::Text),
            StyledText::new("---", Style::Dim),
        ];
        lines.extend(summary.to_styled_text());
        write_lines(&mut state.console, &lines, styler.as_ref())?;

        state.sink.finish(&results, &summary)?;

        let mut trailer = Vec::new();
        if let Some(location) = destination.describe() {
            trailer.push(StyledText::new(
                format!("Results are saved to {}", location),
                Style::Success,
            ));
        }
        trailer.push(StyledText::new("---", Style::Dim));
        write_lines(&mut state.console, &trailer, styler.as_ref())?;

        info!(
            errors = summary.error_count,
            warnings = summary.warning_count,
            total = summary.total_count,
            "Run finished"
        );

        Ok(summary)
    }
}
