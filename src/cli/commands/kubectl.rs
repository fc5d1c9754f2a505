//! Kubectl command - run kubectl against every target
//!
//! This module implements the `kubectl` (alias `k`) subcommand.

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use kubekraken::executor::{Executor, ProcessRunner};
use kubekraken::output::styler_for;
use std::sync::Arc;
use tracing::info;

/// Arguments for kubectl command
#[derive(Parser, Debug, Clone)]
pub struct KubectlArgs {
    /// Arguments passed verbatim to kubectl, after --kubeconfig and --context
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl KubectlArgs {
    /// Execute the kubectl command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let targets = ctx.discover_targets()?;
        info!(targets = targets.len(), args = ?self.args, "Running command against targets");

        let runner = ProcessRunner::from_timeout_secs(ctx.timeout);
        let summary = Executor::new(ctx.executor_config(self.args.clone()))
            .with_runner(Arc::new(runner))
            .with_styler(styler_for(ctx.color))
            .run(targets)
            .await?;

        summary.into_result()?;
        Ok(0)
    }
}
