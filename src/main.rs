//! Kubekraken - run one command against many Kubernetes clusters
//!
//! This is the main entry point for the Kubekraken CLI.

mod cli;

use anyhow::Result;
use cli::commands::CommandContext;
use cli::{Cli, Commands};
use kubekraken::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let exit_code = match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: &Cli) -> Result<i32> {
    let config = Config::load(cli.config.as_ref())?;

    init_logging(cli.verbosity(), &config.logging.log_level);

    if cli.verbosity() >= 2 {
        eprintln!("Kubekraken v{}", VERSION);
    }

    let mut ctx = CommandContext::new(cli, config)?;

    match &cli.command {
        Commands::Kubectl(args) => args.execute(&mut ctx).await,
        Commands::ListContexts(args) => args.execute(&mut ctx).await,
    }
}

/// Exit status for a fatal error
fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<kubekraken::Error>()
        .map(kubekraken::Error::exit_code)
        .unwrap_or(1)
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8, default_level: &str) {
    let filter = match verbosity {
        0 => default_level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 3),
        )
        .with(env_filter)
        .init();
}
