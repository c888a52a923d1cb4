//! # Validate Subcommand
//!
//! Converts a JSON view model into a catalog entity under a verb.
//!
//! Prints the materialized entity on success, or the violation list (one
//! JSON array of messages) when the input is rejected.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use mgate_core::{ConversionError, EngineConfig, Verb};

use crate::{read_catalog, read_input, EntityArgs, Loaded, EXIT_INVALID, EXIT_STRUCTURAL};

/// Arguments for the `mgate validate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub target: EntityArgs,

    /// Operation verb: find, get, create, update (put), patch, remove, any.
    #[arg(long, default_value = "any")]
    pub verb: String,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure, 2 on structural error.
pub async fn run_validate(args: &ValidateArgs, config: EngineConfig, out: &mut impl Write) -> Result<u8> {
    let verb: Verb = match args.verb.parse() {
        Ok(verb) => verb,
        Err(e) => {
            tracing::error!("{e}");
            return Ok(EXIT_STRUCTURAL);
        }
    };
    let catalog = read_catalog(&args.target)?;
    let loaded = match Loaded::from_catalog(&catalog, &args.target.entity, config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(catalog = %args.target.catalog.display(), "{e}");
            return Ok(EXIT_STRUCTURAL);
        }
    };
    let input = read_input(args.target.input.as_deref())?;

    match loaded.engine.from_view_model_ref(&loaded.entity, &input, verb).await {
        Ok(entity) => {
            serde_json::to_writer_pretty(&mut *out, &entity).context("failed to write entity")?;
            writeln!(out)?;
            Ok(0)
        }
        Err(ConversionError::Validation(errors)) => {
            tracing::info!(violations = errors.len(), "view model rejected");
            serde_json::to_writer_pretty(&mut *out, &errors).context("failed to write violations")?;
            writeln!(out)?;
            Ok(EXIT_INVALID)
        }
        Err(ConversionError::Structural(e)) => {
            tracing::error!(entity = %args.target.entity, "{e}");
            Ok(EXIT_STRUCTURAL)
        }
    }
}
