//! sbom-enforcer: verify a build artifact against its CycloneDX SBOM
//!
//! Resolves every declared dependency and runs integrity rules over the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sbom_enforcer::{
    cli::{self, CheckConfig},
    config::{CliOverrides, EnforcerConfig},
    pipeline::exit_codes,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sbom-enforcer")]
#[command(version)]
#[command(about = "Verify build artifacts against their CycloneDX SBOM", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  All rules passed
    1  A rule reported violations
    2  Error occurred

EXAMPLES:
    # Verify checksums of every dependency
    sbom-enforcer check --artifact target/app-1.0.jar --bom target/app-1.0-cyclonedx.json

    # Use only the local repository
    sbom-enforcer check --artifact app.jar --bom bom.xml --offline

    # Write a commented configuration file
    sbom-enforcer example-config > .sbom-enforcer.yaml")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "SBOM_ENFORCER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `check` subcommand
#[derive(Parser)]
struct CheckArgs {
    /// The built artifact the BOM describes
    #[arg(long)]
    artifact: PathBuf,

    /// BOM file of the artifact (`.xml` or `.json`); the first one is verified
    #[arg(long = "bom", value_name = "PATH", required = true)]
    boms: Vec<PathBuf>,

    /// Local repository directory (default: ~/.m2/repository)
    #[arg(long, env = "SBOM_ENFORCER_LOCAL_REPOSITORY")]
    local_repository: Option<PathBuf>,

    /// Never download missing artifacts
    #[arg(long)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify an artifact and its dependencies against the BOM
    Check(CheckArgs),

    /// Print a commented example configuration
    ExampleConfig,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check(args) => {
            let overrides = CliOverrides {
                local_repository: args.local_repository,
                offline: args.offline,
            };
            let (enforcer, loaded_from) =
                EnforcerConfig::from_file_with_overrides(cli.config.as_deref(), &overrides)
                    .context("Failed to load configuration")?;
            if let Some(path) = loaded_from {
                tracing::debug!("Loaded configuration from {}", path.display());
            }

            cli::run_check(&CheckConfig {
                artifact: args.artifact,
                boms: args.boms,
                enforcer,
                quiet: cli.quiet,
            })
        }
        Commands::ExampleConfig => Ok(cli::run_example_config()),
    }
}
