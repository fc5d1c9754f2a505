//! List-contexts command
//!
//! Prints every discovered target, one `<kubeconfig> - <context>` line each,
//! or a JSON / YAML list when an output format other than text is given.

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use kubekraken::executor::{OutputFormat, Target};

/// Arguments for list-contexts command
#[derive(Parser, Debug, Clone, Default)]
pub struct ListContextsArgs {}

impl ListContextsArgs {
    /// Execute the list-contexts command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let targets = ctx.discover_targets()?;
        print!("{}", render(&targets, ctx.output_format)?);
        Ok(0)
    }
}

fn render(targets: &[Target], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => targets
            .iter()
            .map(|t| format!("{} - {}\n", t.kubeconfig, t.context))
            .collect(),
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(targets)?),
        OutputFormat::Yaml => serde_yaml::to_string(targets)?,
    })
}
