//! Source projection.
//!
//! Builds entities from stored records by plain structural copy, without
//! running the conversion rules: internal-prefixed fields (other than the
//! identifier) and ignored fields are dropped, everything else is copied.

use serde_json::Value;

use mgate_core::StructuralError;

use crate::engine::ConversionEngine;
use crate::entity::{EntityRef, SchemaEntity};
use crate::value::{is_exposed, Entity, FieldValue};

/// Result of [`ConversionEngine::from_source`].
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// The source was `null`.
    Absent,
    /// The source was a single record.
    One(Entity),
    /// The source was a sequence; one entity per element, same order.
    Many(Vec<Entity>),
}

impl Projection {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The single entity, if the source was a record.
    pub fn into_one(self) -> Option<Entity> {
        match self {
            Self::One(entity) => Some(entity),
            _ => None,
        }
    }

    /// The entities, if the source was a sequence.
    pub fn into_many(self) -> Option<Vec<Entity>> {
        match self {
            Self::Many(entities) => Some(entities),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Absent => Value::Null,
            Self::One(entity) => entity.to_json(),
            Self::Many(entities) => Value::Array(entities.iter().map(Entity::to_json).collect()),
        }
    }
}

impl ConversionEngine {
    /// Copy a stored record (or sequence of records) into entities of `T`.
    ///
    /// # Errors
    ///
    /// [`StructuralError::SourceNotRecordOrSequence`] for scalar sources.
    pub fn from_source<T: SchemaEntity>(
        &self,
        source: &Value,
        ignored: &[&str],
    ) -> Result<Projection, StructuralError> {
        self.from_source_ref(&EntityRef::of::<T>(), source, ignored)
    }

    /// [`Self::from_source`] for a type-erased entity handle.
    pub fn from_source_ref(
        &self,
        entity: &EntityRef,
        source: &Value,
        ignored: &[&str],
    ) -> Result<Projection, StructuralError> {
        match source {
            Value::Null => Ok(Projection::Absent),
            Value::Array(records) => Ok(Projection::Many(
                records
                    .iter()
                    .map(|record| self.copy_record(entity, record, ignored))
                    .collect(),
            )),
            Value::Object(_) => Ok(Projection::One(self.copy_record(entity, source, ignored))),
            _ => {
                tracing::warn!(entity = entity.id(), "source is neither record nor sequence");
                Err(StructuralError::SourceNotRecordOrSequence)
            }
        }
    }

    fn copy_record(&self, entity: &EntityRef, record: &Value, ignored: &[&str]) -> Entity {
        let mut out = Entity::empty(entity.id());
        if let Some(fields) = record.as_object() {
            for (name, value) in fields {
                if is_exposed(self.config(), name, ignored) {
                    out.insert(name.as_str(), FieldValue::from_json(value));
                }
            }
        }
        out
    }
}
