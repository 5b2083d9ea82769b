//! CLI command definitions for stackenv
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod export;
pub mod generate;
pub mod merge;

use crate::config::DEFAULT_CONFIG_FILENAME;
use clap::{Parser, Subcommand};
use export::ExportArgs;
use generate::GenerateArgs;
use merge::MergeArgs;

/// Layered environment compiler for docker-compose deployments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the configuration file
    #[arg(short, long, global = true, default_value = ".")]
    pub path: String,

    /// Name of the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILENAME)]
    pub filename: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved configuration as JSON
    Export(ExportArgs),

    /// Write per-server env files and compose overrides
    Generate(GenerateArgs),

    /// Merge a second configuration file into this one
    Merge(MergeArgs),
}
