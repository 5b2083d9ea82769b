//! Generate subcommand.
//!
//! Compiles the configuration into per-server `.env` files and a compose
//! override wiring each service's `env_file`.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the generate subcommand
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Directory to write per-server env files into, relative to the
    /// configuration directory
    #[arg(long, value_name = "DIR", default_value = "envs")]
    pub envs_dir: PathBuf,

    /// Compose file format version for the generated override
    #[arg(long, value_name = "VERSION", default_value = "3.9")]
    pub compose_version: String,
}
