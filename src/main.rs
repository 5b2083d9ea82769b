//! stackenv
//!
//! Compiles a layered YAML environment configuration (global and per-server
//! namespaces) into per-server `.env` files and docker-compose overrides.

use anyhow::Result;
use clap::Parser;
use stackenv::cli::export::ExportArgs;
use stackenv::cli::generate::GenerateArgs;
use stackenv::cli::merge::MergeArgs;
use stackenv::cli::{Cli, Command};
use stackenv::compose::{DOCKER_COMPOSE_OVERRIDE_FILENAME, EditableDockerCompose};
use stackenv::config::ConfigFile;
use stackenv::envfile::write_server_envs;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    match cli.command {
        Command::Export(ref args) => run_export(&cli, args.clone()),
        Command::Generate(ref args) => run_generate(&cli, args.clone()),
        Command::Merge(ref args) => run_merge(&cli, args.clone()),
    }
}

/// Run the export command: resolve the configuration and emit it as JSON.
fn run_export(cli: &Cli, args: ExportArgs) -> Result<()> {
    let config = ConfigFile::load(&cli.path, &cli.filename, false)?;
    let export = config.export_dict();

    let text = if args.pretty {
        serde_json::to_string_pretty(&export)?
    } else {
        serde_json::to_string(&export)?
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, text)?;
            info!("Exported configuration to {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Run the generate command: write per-server env files and one compose
/// override per server wiring each service's `env_file`.
fn run_generate(cli: &Cli, args: GenerateArgs) -> Result<()> {
    let config = ConfigFile::load(&cli.path, &cli.filename, true)?;
    if config.servers().is_empty() {
        info!("Configuration declares no servers, nothing to generate");
        return Ok(());
    }

    let envs_root = Path::new(&cli.path).join(&args.envs_dir);
    for server in config.servers() {
        let store = config.server_store(server)?;
        let env_files = write_server_envs(&envs_root, server, store)?;

        // env_file paths are relative to the override's own directory.
        let mut compose = EditableDockerCompose::new(&args.compose_version);
        for service in env_files.keys() {
            compose.set_service_env_file(service, format!("{service}.env"));
        }
        compose.write_to(envs_root.join(server), DOCKER_COMPOSE_OVERRIDE_FILENAME)?;

        info!(
            server,
            services = env_files.len(),
            "Server environment compiled"
        );
    }
    Ok(())
}

/// Run the merge command: fold a second configuration into the base one and
/// write the combined configuration.
fn run_merge(cli: &Cli, args: MergeArgs) -> Result<()> {
    let base = ConfigFile::load(&cli.path, &cli.filename, false)?;

    let other_dir = match args.other.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let other_name = args
        .other
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid configuration path: {}", args.other.display()))?;
    let other = ConfigFile::load(other_dir, other_name, true)?;

    let merged = ConfigFile::merge(&base, &other, args.policy.into());
    let export = merged.export_dict();

    let text = if args.json {
        serde_json::to_string_pretty(&export)?
    } else {
        serde_yaml::to_string(&export)?
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, text)?;
            info!("Merged configuration written to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
