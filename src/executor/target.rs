//! Execution targets.

use serde::{Deserialize, Serialize};

/// One (kubeconfig, context) pair to run the command against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Stable key used for result storage and output file names
    pub id: String,
    /// Path of the kubeconfig file the context comes from
    pub kubeconfig: String,
    /// Context name inside the kubeconfig
    pub context: String,

    /// 1-based dequeue order, 0 until the dispatcher assigns it
    #[serde(skip)]
    pub index: usize,
}

impl Target {
    /// Create a target for a context of a kubeconfig file
    pub fn new(kubeconfig: impl Into<String>, context: impl Into<String>) -> Self {
        let kubeconfig = kubeconfig.into();
        let context = context.into();

        Self {
            id: target_id(&kubeconfig, &context),
            kubeconfig,
            context,
            index: 0,
        }
    }

    /// Arguments selecting this target, placed before the user's arguments
    pub fn command_args(&self) -> [&str; 4] {
        ["--kubeconfig", &self.kubeconfig, "--context", &self.context]
    }
}

/// Derive a filesystem-safe id from a kubeconfig path and a context name.
pub fn target_id(kubeconfig: &str, context: &str) -> String {
    let raw = format!("{}@{}", kubeconfig.trim_start_matches('/'), context);
    raw.replace(['/', '\\'], "--")
}
