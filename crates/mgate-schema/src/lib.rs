//! # mgate-schema: Schema Entities and the Conversion Engine
//!
//! Turns untrusted view models into validated entities, and stored records
//! into outward projections.
//!
//! ## Declaring entities
//!
//! Entity types are described by an ordered [`Schema`] of [`FieldSpec`]s,
//! either in code (implement [`SchemaEntity`]) or in a YAML document loaded
//! into a [`SchemaCatalog`]. Both are used through the same [`EntityRef`]
//! handle.
//!
//! ## Converting
//!
//! A [`ConversionEngine`] owns the frozen type registry used for
//! polymorphic dispatch and the [`mgate_core::EngineConfig`]. Its
//! `from_view_model` entry points either return a materialized [`Entity`]
//! or fail with every violation found; `from_source` copies stored records
//! without validation.
//!
//! ## Crate Policy
//!
//! - Depends only on `mgate-core` internally.
//! - Converted entities never contain field specifications, only
//!   [`FieldValue`]s.
//! - Validation is a trust boundary: input is never partially accepted.

pub mod cast;
pub mod catalog;
pub mod descriptor;
pub mod engine;
pub mod entity;
pub mod field;
pub mod source;
pub mod value;

pub use cast::{cast, CastOutcome};
pub use catalog::SchemaCatalog;
pub use descriptor::{EntityResolver, NoEntities};
pub use engine::{ConversionContext, ConversionEngine};
pub use entity::{EntityRef, Schema, SchemaEntity};
pub use field::{DefaultValue, FieldKind, FieldSpec};
pub use source::Projection;
pub use value::{Entity, FieldValue};
