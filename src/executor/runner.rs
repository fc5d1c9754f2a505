//! External command invocation.
//!
//! [`CommandRunner`] is the seam between the executor and the process that
//! actually talks to a cluster. Runners never fail: spawn errors, non-zero
//! exits and timeouts are all reported through [`CommandOutput::error`].

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

/// Captured result of one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Raw stdout bytes
    pub stdout: Vec<u8>,
    /// Raw stderr bytes
    pub stderr: Vec<u8>,
    /// Failure description, `None` when the command succeeded
    pub error: Option<String>,
}

impl CommandOutput {
    /// A successful invocation
    pub fn success(stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            error: None,
        }
    }

    /// A failed invocation
    pub fn failure(
        error: impl Into<String>,
        stdout: impl Into<Vec<u8>>,
        stderr: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            error: Some(error.into()),
        }
    }
}

/// Runs an external program and captures its output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion.
    async fn run(&self, program: &str, args: &[String]) -> CommandOutput;
}

/// Runs commands as local child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Create a runner without a time limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create a runner from a timeout in seconds, 0 meaning unbounded
    pub fn from_timeout_secs(secs: u64) -> Self {
        let runner = Self::new();
        if secs > 0 {
            runner.with_timeout(Duration::from_secs(secs))
        } else {
            runner
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> CommandOutput {
        debug!(program = %program, args = ?args, "Executing command");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return CommandOutput::failure(
                    format!("failed to run {}: {}", program, e),
                    Vec::new(),
                    Vec::new(),
                )
            }
        };

        // Dropping the wait future on timeout kills the child.
        let waited = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(waited) => waited,
                Err(_) => {
                    return CommandOutput::failure(
                        format!("timed out after {:?}", timeout),
                        Vec::new(),
                        Vec::new(),
                    )
                }
            },
            None => child.wait_with_output().await,
        };

        let output = match waited {
            Ok(output) => output,
            Err(e) => {
                return CommandOutput::failure(
                    format!("failed to wait for {}: {}", program, e),
                    Vec::new(),
                    Vec::new(),
                )
            }
        };

        trace!(
            status = ?output.status.code(),
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "Command completed"
        );

        if output.status.success() {
            CommandOutput::success(output.stdout, output.stderr)
        } else {
            let error = match output.status.code() {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            };
            CommandOutput::failure(error, output.stdout, output.stderr)
        }
    }
}
