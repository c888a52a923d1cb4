//! # mgate CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mgate_cli::project::{run_project, ProjectArgs};
use mgate_cli::validate::{run_validate, ValidateArgs};
use mgate_cli::{EngineArgs, EXIT_STRUCTURAL};

/// model-gate CLI
///
/// Validates JSON view models against entities of a YAML schema catalog,
/// and projects stored records into their outward view.
#[derive(Parser, Debug)]
#[command(name = "mgate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a view model into an entity under a verb.
    Validate(ValidateArgs),

    /// Project a stored record into its outward view.
    Project(ProjectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("failed to start runtime: {e}");
            return ExitCode::from(EXIT_STRUCTURAL);
        }
    };

    let result = runtime.block_on(async {
        let config = cli.engine.resolve()?;
        tracing::debug!(?config, "resolved engine configuration");
        let mut stdout = std::io::stdout().lock();
        match &cli.command {
            Commands::Validate(args) => run_validate(args, config, &mut stdout).await,
            Commands::Project(args) => run_project(args, config, &mut stdout),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_STRUCTURAL)
        }
    }
}
