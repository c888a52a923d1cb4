//! # mgate-core: Foundational Types for model-gate
//!
//! model-gate converts untrusted view models into validated entities
//! according to declarative per-field schemas. This crate holds the pieces
//! every layer shares and that carry no schema knowledge of their own.
//!
//! ## Contents
//!
//! - [`error`]: `StructuralError`, `ValidationErrors`, `ConversionError`.
//!   The two failure kinds are disjoint and never mixed.
//! - [`verb`]: the operation context that gates field participation.
//! - [`coerce`]: loose reading of untyped JSON scalars as text and numbers.
//! - [`temporal`]: date values, including the invalid-date sentinel.
//! - [`registry`]: the startup-time `(type, subtype)` registry, frozen
//!   before any conversion runs.
//! - [`config`]: conventional field names (`_id`, `_`, `type`).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mgate-*` crates (this is the leaf of the DAG).
//! - No global mutable state.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod coerce;
pub mod config;
pub mod error;
pub mod registry;
pub mod temporal;
pub mod verb;

// Re-export primary types for ergonomic imports.
pub use config::EngineConfig;
pub use error::{ConfigError, ConversionError, ErrorClass, StructuralError, ValidationErrors};
pub use registry::{RegistryBuilder, TypeKey, TypeRegistry, TypeTagged};
pub use temporal::Temporal;
pub use verb::Verb;
