//! # Conversion Engine
//!
//! Walks an entity type's fields against untrusted input and produces a
//! materialized [`Entity`] or the full ordered list of violations.
//!
//! ## Field resolution
//!
//! For each declared field, in declaration order:
//!
//! 1. Fields without a kind, and fields hidden under the active verb, are
//!    skipped and never appear in the output.
//! 2. A fixed `value` always wins; input is not consulted.
//! 3. A field present in the input (or carrying a present default) is
//!    resolved. Entity-valued kinds recurse, reading a non-record value as
//!    `{}`. Sequences of entities dispatch each element. Everything else
//!    goes through [`cast`].
//! 4. An absent field that is required for the verb is reported as
//!    `"<field> is required"`.
//!
//! Violations accumulate across the whole tree, nested ones unprefixed.
//! An undetectable polymorphic element aborts the call with a
//! [`StructuralError`] instead.
//!
//! ## Concurrency
//!
//! The engine holds only the frozen registry and configuration. Every call
//! builds its own blueprint and error list, so one engine can serve
//! concurrent conversions.

use serde_json::{Map, Value};

use mgate_core::{
    coerce, ConversionError, EngineConfig, StructuralError, TypeRegistry, ValidationErrors, Verb,
};

use crate::cast::{cast, CastOutcome};
use crate::entity::{EntityRef, SchemaEntity};
use crate::field::{FieldKind, FieldSpec};
use crate::value::{Entity, FieldValue};

/// Per-call state threaded through the recursion.
#[derive(Debug, Clone, Default)]
pub struct ConversionContext {
    pub verb: Verb,
    pub errors: ValidationErrors,
}

impl ConversionContext {
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            errors: ValidationErrors::new(),
        }
    }
}

/// Converts view models into entities.
#[derive(Debug, Clone, Default)]
pub struct ConversionEngine {
    registry: TypeRegistry<EntityRef>,
    config: EngineConfig,
}

impl ConversionEngine {
    pub fn new(registry: TypeRegistry<EntityRef>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &TypeRegistry<EntityRef> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Convert `input` into an entity of type `T` under `verb`.
    ///
    /// Scalar and `null` input yields an empty entity. An array is read as
    /// a record with no fields, so required fields are still reported.
    ///
    /// # Errors
    ///
    /// [`ConversionError::Validation`] with every violation found, or
    /// [`ConversionError::Structural`] for schema and dispatch faults.
    pub async fn from_view_model<T: SchemaEntity>(
        &self,
        input: &Value,
        verb: Verb,
    ) -> Result<Entity, ConversionError> {
        self.convert(&EntityRef::of::<T>(), input, verb)
    }

    /// [`Self::from_view_model`] for a type-erased entity handle.
    pub async fn from_view_model_ref(
        &self,
        entity: &EntityRef,
        input: &Value,
        verb: Verb,
    ) -> Result<Entity, ConversionError> {
        self.convert(entity, input, verb)
    }

    /// Synchronous core of the conversion entry points.
    pub fn convert(&self, entity: &EntityRef, input: &Value, verb: Verb) -> Result<Entity, ConversionError> {
        let mut ctx = ConversionContext::new(verb);
        let converted = self.convert_in(entity, input, &mut ctx).map_err(|err| {
            tracing::warn!(entity = entity.id(), verb = %verb, error = %err, "conversion aborted");
            err
        })?;
        if ctx.errors.is_empty() {
            tracing::debug!(entity = entity.id(), verb = %verb, fields = converted.len(), "converted view model");
            Ok(converted)
        } else {
            tracing::debug!(
                entity = entity.id(),
                verb = %verb,
                violations = ctx.errors.len(),
                "view model rejected"
            );
            Err(ConversionError::Validation(ctx.errors))
        }
    }

    /// Convert one entity, appending violations to `ctx`.
    pub fn convert_in(
        &self,
        entity: &EntityRef,
        input: &Value,
        ctx: &mut ConversionContext,
    ) -> Result<Entity, StructuralError> {
        let no_fields = Map::new();
        let record = match input {
            Value::Object(record) => record,
            Value::Array(_) => &no_fields,
            _ => return Ok(Entity::empty(entity.id())),
        };
        let schema = entity.blueprint()?;
        let mut out = Entity::empty(entity.id());
        for (name, spec) in schema.iter() {
            let Some(kind) = &spec.kind else {
                continue;
            };
            if !spec.is_visible(ctx.verb) {
                tracing::trace!(field = name, verb = %ctx.verb, "field hidden for verb");
                continue;
            }
            if let Some(value) = self.resolve_field(name, kind, spec, record, ctx)? {
                out.insert(name, value);
            }
        }
        Ok(out)
    }

    fn resolve_field(
        &self,
        name: &str,
        kind: &FieldKind,
        spec: &FieldSpec,
        record: &Map<String, Value>,
        ctx: &mut ConversionContext,
    ) -> Result<Option<FieldValue>, StructuralError> {
        if let Some(fixed) = &spec.value {
            return Ok(Some(fixed.clone()));
        }
        let input = record.get(name);
        if input.is_none() && !spec.has_present_default() {
            if spec.is_required_for(ctx.verb) {
                ctx.errors.required(name);
            }
            return Ok(None);
        }
        tracing::trace!(field = name, kind = %kind.name(), "resolving field");

        if let Some(candidates) = kind.entity_candidates() {
            let sub_input = input.unwrap_or(&Value::Null);
            let target = self.detect(name, candidates, sub_input)?;
            return self.convert_nested(target, sub_input, ctx).map(Some);
        }
        if let (FieldKind::Sequence(element), Some(Value::Array(items))) = (kind, input) {
            if let Some(candidates) = element.entity_candidates() {
                let mut converted = Vec::with_capacity(items.len());
                for item in items {
                    let target = self.detect(name, candidates, item)?;
                    converted.push(Some(self.convert_nested(target, item, ctx)?));
                }
                return Ok(Some(FieldValue::Sequence(converted)));
            }
        }

        match cast(kind, input, spec) {
            CastOutcome::Value(value) => Ok(Some(value)),
            CastOutcome::Invalid => {
                ctx.errors.invalid(name);
                Ok(None)
            }
            CastOutcome::NoValue if spec.is_required_for(ctx.verb) => {
                ctx.errors.required(name);
                Ok(None)
            }
            CastOutcome::NoValue => Ok(spec.default.as_ref().and_then(|default| default.produce())),
        }
    }

    fn convert_nested(
        &self,
        target: &EntityRef,
        input: &Value,
        ctx: &mut ConversionContext,
    ) -> Result<FieldValue, StructuralError> {
        let empty = Value::Object(Map::new());
        let input = if input.is_object() { input } else { &empty };
        self.convert_in(target, input, ctx).map(FieldValue::Entity)
    }

    /// Pick the concrete entity type for one polymorphic element.
    ///
    /// A single candidate is used as is. Otherwise the discriminator field
    /// names the type, and the element's value under that type name (if
    /// any) is the subtype; the registry hit must be one of `candidates`.
    pub fn detect<'c>(
        &self,
        field: &str,
        candidates: &'c [EntityRef],
        element: &Value,
    ) -> Result<&'c EntityRef, StructuralError> {
        if let [only] = candidates {
            return Ok(only);
        }
        let type_tag = element
            .get(&self.config.discriminator_field)
            .filter(|value| coerce::is_truthy(value))
            .map(coerce::to_text)
            .unwrap_or_default();
        let sub_type = if type_tag.is_empty() {
            String::new()
        } else {
            element
                .get(&type_tag)
                .filter(|value| !value.is_null())
                .map(coerce::to_text)
                .unwrap_or_default()
        };
        let hit = self.registry.resolve_type(&type_tag, &sub_type);
        hit.and_then(|hit| candidates.iter().find(|candidate| *candidate == hit))
            .ok_or_else(|| {
                tracing::warn!(field, type_tag = %type_tag, sub_type = %sub_type, "undetected model type");
                StructuralError::UndetectedModelType {
                    field: field.to_string(),
                }
            })
    }
}
