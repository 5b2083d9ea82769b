//! Merge subcommand.
//!
//! Merges a second configuration file into the base one and writes the
//! combined configuration, for redeploy workflows that fold an override
//! config into the deployed one.

use crate::config::MergePolicy;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Conflict-resolution policy, as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PolicyArg {
    /// Keep the base configuration's value on conflict (default)
    #[default]
    Preserve,
    /// Take the merged-in configuration's value on conflict
    Override,
}

impl From<PolicyArg> for MergePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Preserve => MergePolicy::Preserve,
            PolicyArg::Override => MergePolicy::Override,
        }
    }
}

/// Arguments for the merge subcommand
#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Path of the configuration file to merge into the base one
    #[arg(value_name = "FILE")]
    pub other: PathBuf,

    /// How to resolve a key present with different values in both files
    #[arg(long, value_enum, default_value_t = PolicyArg::Preserve)]
    pub policy: PolicyArg,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}
