//! Target inventory for Kubekraken.
//!
//! Targets are discovered from kubeconfig files:
//! - Single files or directories of kubeconfig files
//! - Path filters applied to files found in directories
//! - Context filters and current-context selection

pub mod kubeconfig;

pub use kubeconfig::{
    default_kubeconfig_paths, discover_all, discover_targets, parse_kubeconfig_file,
    ContextDetails, Kubeconfig, NamedContext, TargetFilter,
};
