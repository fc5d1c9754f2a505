//! # Kubekraken - One Command, Many Clusters
//!
//! Kubekraken fans a single external command (usually `kubectl`) out across
//! every context of a set of kubeconfig files, bounds concurrency with a worker
//! pool, and reports per-cluster results plus a final summary on the console,
//! in a combined output file, or in an output directory.
//!
//! ## Core Concepts
//!
//! - **Targets**: one (kubeconfig, context) pair each, discovered by [`inventory`]
//! - **Tasks**: one run of the command against one target
//! - **Print decisions**: which of error / stdout / stderr are shown and saved
//! - **Output conditions**: contains / not-contains filters over stdout
//! - **Summary**: errors, warnings and totals once every target is done
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           CLI Interface                              │
//! │                    (clap-based command parsing)                      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!          ┌─────────────────────────┴─────────────────────────┐
//!          ▼                                                   ▼
//! ┌─────────────────────┐                         ┌─────────────────────┐
//! │      Inventory      │ ───── Vec<Target> ────▶ │      Executor       │
//! │  (kubeconfig files  │                         │ (tokio worker pool  │
//! │   + regex filters)  │                         │  + task processor)  │
//! └─────────────────────┘                         └─────────────────────┘
//!                                                            │
//!                              ┌─────────────────────────────┼──────────────┐
//!                              ▼                             ▼              ▼
//!                    ┌──────────────────┐       ┌────────────────┐  ┌──────────────┐
//!                    │  CommandRunner   │       │  Output sink   │  │   Console    │
//!                    │ (child process)  │       │ (file / dir)   │  │  (Styler)    │
//!                    └──────────────────┘       └────────────────┘  └──────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use kubekraken::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let filter = TargetFilter::new(None, None, false, Some("^prod"), None)?;
//!     let targets = discover_all(&["~/.kube/config"], &filter)?;
//!
//!     let config = ExecutorConfig {
//!         workers: 5,
//!         args: vec!["get".into(), "nodes".into()],
//!         ..Default::default()
//!     };
//!
//!     let summary = Executor::new(config).run(targets).await?;
//!     println!("{}", summary.trailer());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Error handling
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::Config;

    // Execution engine
    pub use crate::executor::{
        CommandOutput, CommandRunner, Executor, ExecutorConfig, OutputCondition,
        OutputDestination, OutputFormat, PrintPolicy, ProcessRunner, RunSummary, Target,
        TaskResult,
    };

    // Inventory
    pub use crate::inventory::{discover_all, discover_targets, TargetFilter};

    // Console styling
    pub use crate::output::{ColorStyler, PlainStyler, Style, Styler};
}

// ============================================================================
// Core Modules
// ============================================================================

/// Error types and result aliases for Kubekraken operations.
///
/// Per-target command failures are data inside
/// [`TaskResult`](executor::TaskResult); the [`Error`](error::Error) enum
/// covers configuration problems, broken output sinks and the final
/// "not all clusters were processed successfully" verdict.
pub mod error;

/// Configuration loading from files and environment variables.
pub mod config;

/// Styled console rendering.
pub mod output;

// ============================================================================
// Targets and Execution
// ============================================================================

/// Kubeconfig discovery and context selection.
pub mod inventory;

/// Parallel task execution engine.
///
/// This module provides the [`Executor`](executor::Executor) that runs a
/// command against every target with a bounded worker pool. Key features:
/// - **Bounded concurrency**: at most `workers` commands in flight
/// - **Print decisions**: errors always force full visibility
/// - **Persistence**: text, JSON or YAML, to a file or a directory
///
/// # Example
///
/// ```rust,ignore
/// use kubekraken::executor::{Executor, ExecutorConfig};
///
/// let config = ExecutorConfig {
///     workers: 10,
///     ..Default::default()
/// };
///
/// let summary = Executor::new(config).run(targets).await?;
/// ```
pub mod executor;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
