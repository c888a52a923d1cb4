//! # Error Types: Two Disjoint Failure Kinds
//!
//! Conversion can fail in exactly two ways, and they never mix:
//!
//! - [`ValidationErrors`]: the ordered list of per-field violations found
//!   while walking untrusted input (`"<field> is required"`,
//!   `"<field> has invalid data"`). Collection never short-circuits; the
//!   list is surfaced once, after every field has been evaluated.
//! - [`StructuralError`]: programmer or configuration mistakes (malformed
//!   schema fragments, unrecognized registrations, undetectable polymorphic
//!   types). Raised immediately and never appended to a validation list.
//!
//! [`ConversionError`] is the union returned by the conversion entry
//! points. Callers map [`ErrorClass::Client`] to a client-error response
//! carrying the message list verbatim, and [`ErrorClass::Server`] to a
//! server fault.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A programmer or configuration mistake detected by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A schema fragment was not record-like.
    #[error("Schema should be an object")]
    SchemaNotRecord,

    /// `from_source` received something that is neither a record nor a sequence.
    #[error("Model should be object or array")]
    SourceNotRecordOrSequence,

    /// No declared candidate matched the discriminator of a polymorphic element.
    #[error("Could not detect model type of {field}")]
    UndetectedModelType {
        /// The field holding the polymorphic value.
        field: String,
    },

    /// A registration call carried no type tag.
    #[error("Can not recognize entity registration format")]
    UnrecognizedRegistration,

    /// A verb name did not match any known operation.
    #[error("unknown verb: {0:?}")]
    UnknownVerb(String),

    /// A declarative field descriptor was malformed.
    #[error("invalid field descriptor for {field}: {reason}")]
    InvalidDescriptor {
        /// Field whose descriptor was rejected.
        field: String,
        /// Why the descriptor was rejected.
        reason: String,
    },

    /// A declarative schema referenced an entity name nobody defined.
    #[error("unknown entity reference: {0:?}")]
    UnknownEntity(String),

    /// A declarative schema document could not be parsed.
    #[error("malformed schema document: {0}")]
    MalformedDocument(String),
}

/// Ordered list of field violations collected during one conversion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    messages: Vec<String>,
}

impl ValidationErrors {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a violation.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Append `"<field> is required"`.
    pub fn required(&mut self, field: &str) {
        self.push(format!("{field} is required"));
    }

    /// Append `"<field> has invalid data"`.
    pub fn invalid(&mut self, field: &str) {
        self.push(format!("{field} has invalid data"));
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the messages in the order they were found.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<String> {
        self.messages
    }
}

impl From<Vec<String>> for ValidationErrors {
    fn from(messages: Vec<String>) -> Self {
        Self { messages }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Failure of a conversion call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// One or more fields violated their specification.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The schema or registry setup is broken.
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Which side of a client/server boundary a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller sent bad input; report the messages back verbatim.
    Client,
    /// The service is misconfigured; do not expose details.
    Server,
}

impl ConversionError {
    /// Classify this failure for response mapping.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) => ErrorClass::Client,
            Self::Structural(_) => ErrorClass::Server,
        }
    }

    /// The violation list, if this is a validation failure.
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Structural(_) => None,
        }
    }
}

impl From<ValidationErrors> for ConversionError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Configuration loading failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable was set to an empty string.
    #[error("{0} must not be empty")]
    Empty(String),
}
