//! # Project Subcommand
//!
//! Copies a stored record, or an array of records, into the outward view of
//! a catalog entity: internal fields (except the identifier) and ignored
//! fields are dropped.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use mgate_core::EngineConfig;

use crate::{read_catalog, read_input, EntityArgs, Loaded, EXIT_STRUCTURAL};

/// Arguments for the `mgate project` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub target: EntityArgs,

    /// Field to leave out. Repeatable.
    #[arg(long = "ignore", value_name = "FIELD")]
    pub ignore: Vec<String>,
}

/// Execute the project subcommand.
///
/// Returns exit code: 0 on success, 2 on structural error.
pub fn run_project(args: &ProjectArgs, config: EngineConfig, out: &mut impl Write) -> Result<u8> {
    let catalog = read_catalog(&args.target)?;
    let loaded = match Loaded::from_catalog(&catalog, &args.target.entity, config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(catalog = %args.target.catalog.display(), "{e}");
            return Ok(EXIT_STRUCTURAL);
        }
    };
    let input = read_input(args.target.input.as_deref())?;
    let ignored: Vec<&str> = args.ignore.iter().map(String::as_str).collect();

    match loaded.engine.from_source_ref(&loaded.entity, &input, &ignored) {
        Ok(projection) => {
            serde_json::to_writer_pretty(&mut *out, &projection.to_json())
                .context("failed to write projection")?;
            writeln!(out)?;
            Ok(0)
        }
        Err(e) => {
            tracing::error!(entity = %args.target.entity, "{e}");
            Ok(EXIT_STRUCTURAL)
        }
    }
}
