//! Shared test utilities and fixtures for the Kubekraken test suite.
//!
//! This module provides:
//! - A scripted mock implementation of the CommandRunner trait
//! - A console capture buffer
//! - Target and kubeconfig fixture helpers
//!
//! # Usage
//!
//! Include this module in your integration tests:
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use kubekraken::executor::{
    CommandOutput, CommandRunner, Executor, ExecutorConfig, Target,
};
use kubekraken::output::PlainStyler;

// ============================================================================
// Mock Command Runner
// ============================================================================

/// A recorded invocation of the mock runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
}

impl RecordedCall {
    /// Value following `--context` in the arguments
    pub fn context(&self) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == "--context")
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// Command runner returning scripted outputs keyed by context name
#[derive(Default)]
pub struct MockRunner {
    responses: Mutex<HashMap<String, CommandOutput>>,
    default_response: Mutex<CommandOutput>,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockRunner {
    /// Create a runner that succeeds with empty output for every context
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` inside every invocation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Script the output for a context
    pub fn respond(self, context: &str, output: CommandOutput) -> Self {
        self.responses.lock().insert(context.to_string(), output);
        self
    }

    /// Script the output for contexts without a specific response
    pub fn respond_default(self, output: CommandOutput) -> Self {
        *self.default_response.lock() = output;
        self
    }

    /// All invocations so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of invocations so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Highest number of invocations observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, program: &str, args: &[String]) -> CommandOutput {
        let call = RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
        };
        let context = call.context().unwrap_or_default().to_string();
        self.calls.lock().push(call);

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let scripted = self.responses.lock().get(&context).cloned();
        scripted.unwrap_or_else(|| self.default_response.lock().clone())
    }
}

// ============================================================================
// Console Capture
// ============================================================================

/// Cloneable in-memory console writer
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Targets for the given contexts of one kubeconfig
pub fn targets(contexts: &[&str]) -> Vec<Target> {
    contexts
        .iter()
        .map(|context| Target::new("/kube/config", *context))
        .collect()
}

/// Id of a target created by [`targets`]
pub fn id(context: &str) -> String {
    Target::new("/kube/config", context).id
}

/// Executor wired to a mock runner, a plain styler and a capture buffer
pub fn executor(config: ExecutorConfig, runner: Arc<MockRunner>, console: &SharedBuffer) -> Executor {
    Executor::new(config)
        .with_runner(runner)
        .with_styler(Arc::new(PlainStyler))
        .with_console(Box::new(console.clone()))
}

/// Executor configuration with the given worker count and defaults otherwise
pub fn config_with_workers(workers: usize) -> ExecutorConfig {
    ExecutorConfig {
        workers,
        ..ExecutorConfig::default()
    }
}

/// Write a kubeconfig with the given contexts and current context
pub fn write_kubeconfig(dir: &Path, name: &str, current: &str, contexts: &[&str]) -> PathBuf {
    let mut content = format!(
        "apiVersion: v1\nkind: Config\ncurrent-context: {}\ncontexts:\n",
        current
    );
    for context in contexts {
        content.push_str(&format!(
            "  - name: {0}\n    context:\n      cluster: {0}-cluster\n      user: {0}-user\n",
            context
        ));
    }

    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
