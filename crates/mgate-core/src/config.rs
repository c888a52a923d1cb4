//! Engine configuration.
//!
//! Names the conventional fields the engine treats specially. Defaults
//! match the record layout of document stores (`_id` identifier, `_`
//! internal prefix) and the `type` discriminator. Override via environment
//! variables or explicit construction.

use crate::error::ConfigError;

/// Default identifier field, always retained in outward projections.
pub const DEFAULT_IDENTIFIER_FIELD: &str = "_id";
/// Default prefix marking internal-state fields.
pub const DEFAULT_INTERNAL_PREFIX: &str = "_";
/// Default polymorphic discriminator field.
pub const DEFAULT_DISCRIMINATOR_FIELD: &str = "type";

/// Configuration for a conversion engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Field kept in projections despite carrying the internal prefix.
    pub identifier_field: String,
    /// Fields starting with this prefix are excluded from projections.
    pub internal_prefix: String,
    /// Field read to select among polymorphic candidates.
    pub discriminator_field: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            identifier_field: DEFAULT_IDENTIFIER_FIELD.to_string(),
            internal_prefix: DEFAULT_INTERNAL_PREFIX.to_string(),
            discriminator_field: DEFAULT_DISCRIMINATOR_FIELD.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `MGATE_IDENTIFIER_FIELD` (default: `_id`)
    /// - `MGATE_INTERNAL_PREFIX` (default: `_`)
    /// - `MGATE_DISCRIMINATOR_FIELD` (default: `type`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] when a variable is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |var: &str, default: &str| -> Result<String, ConfigError> {
            match lookup(var) {
                Some(value) if value.is_empty() => Err(ConfigError::Empty(var.to_string())),
                Some(value) => Ok(value),
                None => Ok(default.to_string()),
            }
        };
        Ok(Self {
            identifier_field: read("MGATE_IDENTIFIER_FIELD", DEFAULT_IDENTIFIER_FIELD)?,
            internal_prefix: read("MGATE_INTERNAL_PREFIX", DEFAULT_INTERNAL_PREFIX)?,
            discriminator_field: read("MGATE_DISCRIMINATOR_FIELD", DEFAULT_DISCRIMINATOR_FIELD)?,
        })
    }

    /// Whether `field` belongs in an outward projection.
    pub fn is_projected(&self, field: &str) -> bool {
        field == self.identifier_field || !field.starts_with(&self.internal_prefix)
    }
}
