//! # mgate-cli: CLI Tool for model-gate
//!
//! Provides the `mgate` command-line interface over a YAML schema catalog:
//!
//! ```bash
//! mgate validate --catalog schemas.yaml --entity owner --verb create input.json
//! mgate project --catalog schemas.yaml --entity owner --ignore email record.json
//! ```
//!
//! Input is read from the given file, or from stdin when omitted or `-`.
//! Handlers return the process exit code: 0 on success, 1 on validation
//! failure, 2 on operational or structural error.

pub mod project;
pub mod validate;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use mgate_core::{EngineConfig, StructuralError};
use mgate_schema::{ConversionEngine, EntityRef, SchemaCatalog};

/// Exit code for a rejected view model.
pub const EXIT_INVALID: u8 = 1;
/// Exit code for catalog, schema, and dispatch faults.
pub const EXIT_STRUCTURAL: u8 = 2;

/// Global overrides of the engine configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Identifier field kept in projections.
    #[arg(long, global = true)]
    pub identifier_field: Option<String>,

    /// Prefix of internal fields dropped from projections.
    #[arg(long, global = true)]
    pub internal_prefix: Option<String>,

    /// Field selecting among polymorphic entity types.
    #[arg(long, global = true)]
    pub discriminator_field: Option<String>,
}

impl EngineArgs {
    /// Apply the flags on top of `base`.
    pub fn apply(&self, mut base: EngineConfig) -> EngineConfig {
        if let Some(field) = &self.identifier_field {
            base.identifier_field = field.clone();
        }
        if let Some(prefix) = &self.internal_prefix {
            base.internal_prefix = prefix.clone();
        }
        if let Some(field) = &self.discriminator_field {
            base.discriminator_field = field.clone();
        }
        base
    }

    /// Environment configuration with the flags applied.
    pub fn resolve(&self) -> Result<EngineConfig> {
        let base = EngineConfig::from_env().context("invalid engine configuration")?;
        Ok(self.apply(base))
    }
}

/// Catalog and entity selection shared by the subcommands.
#[derive(Args, Debug, Clone)]
pub struct EntityArgs {
    /// YAML schema catalog.
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Entity name within the catalog.
    #[arg(long, value_name = "NAME")]
    pub entity: String,

    /// JSON input file; stdin when omitted or `-`.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,
}

/// A catalog entity ready for conversion.
pub struct Loaded {
    pub engine: ConversionEngine,
    pub entity: EntityRef,
}

impl Loaded {
    /// Parse catalog text and build an engine around its registry.
    pub fn from_catalog(text: &str, entity: &str, config: EngineConfig) -> Result<Self, StructuralError> {
        let catalog = SchemaCatalog::from_yaml_str(text)?;
        let entity = catalog.entity_ref(entity)?;
        let engine = ConversionEngine::new(catalog.registry()?, config);
        Ok(Self { engine, entity })
    }
}

/// Read the catalog file named by `args`.
pub fn read_catalog(args: &EntityArgs) -> Result<String> {
    std::fs::read_to_string(&args.catalog)
        .with_context(|| format!("failed to read catalog {}", args.catalog.display()))
}

/// Read and parse the JSON input.
pub fn read_input(path: Option<&Path>) -> Result<Value> {
    let text = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}
