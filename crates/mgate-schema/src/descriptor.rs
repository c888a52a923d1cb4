//! # Declarative Field Descriptors
//!
//! Reads schema fragments written as JSON or YAML:
//!
//! ```yaml
//! name:    { type: string, required: true, maxLength: 40 }
//! age:     { type: number, integer: true, min: 0, max: 150 }
//! tags:    { type: [string] }
//! owner:   { type: entity, ref: person }
//! pets:    { type: [entity], ref: [cat, dog] }
//! ```
//!
//! `type` names: `string`, `number`, `boolean`, `date`, `object`, `entity`,
//! or a one-element list of one of those for sequences. Unknown names are
//! kept as [`FieldKind::Unsupported`]. A descriptor without `type` is inert.

use serde_json::{Map, Value};

use mgate_core::{StructuralError, Verb};

use crate::entity::{EntityRef, Schema};
use crate::field::{DefaultValue, FieldKind, FieldSpec};
use crate::value::FieldValue;

/// Resolves entity names used by `ref` keys.
pub trait EntityResolver {
    fn resolve_entity(&self, name: &str) -> Option<EntityRef>;
}

impl<F> EntityResolver for F
where
    F: Fn(&str) -> Option<EntityRef>,
{
    fn resolve_entity(&self, name: &str) -> Option<EntityRef> {
        self(name)
    }
}

/// Resolver for fragments that reference no entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEntities;

impl EntityResolver for NoEntities {
    fn resolve_entity(&self, _name: &str) -> Option<EntityRef> {
        None
    }
}

/// Parse a fragment `{field: descriptor, ...}`.
pub fn parse_fragment(fragment: &Value, resolver: &dyn EntityResolver) -> Result<Schema, StructuralError> {
    let fields = fragment.as_object().ok_or(StructuralError::SchemaNotRecord)?;
    let mut schema = Schema::new();
    for (name, descriptor) in fields {
        let descriptor = descriptor
            .as_object()
            .ok_or_else(|| invalid(name, "descriptor must be an object"))?;
        schema = schema.field(name.clone(), parse_field(name, descriptor, resolver)?);
    }
    Ok(schema)
}

/// Parse one field descriptor.
pub fn parse_field(
    name: &str,
    descriptor: &Map<String, Value>,
    resolver: &dyn EntityResolver,
) -> Result<FieldSpec, StructuralError> {
    let kind = match descriptor.get("type") {
        None | Some(Value::Null) => None,
        Some(kind) => Some(parse_kind(name, kind, descriptor, resolver)?),
    };

    let flag = |key: &str| -> Result<bool, StructuralError> {
        match descriptor.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(invalid(name, &format!("{key} must be a boolean"))),
        }
    };
    let optional_flag = |key: &str| -> Result<Option<bool>, StructuralError> {
        match descriptor.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(invalid(name, &format!("{key} must be a boolean"))),
        }
    };
    let bound = |key: &str| -> Result<Option<f64>, StructuralError> {
        match descriptor.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| invalid(name, &format!("{key} must be a number"))),
        }
    };
    let length = |key: &str| -> Result<Option<usize>, StructuralError> {
        match descriptor.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| invalid(name, &format!("{key} must be a non-negative integer"))),
        }
    };

    let mut spec = FieldSpec {
        kind,
        required: flag("required")?,
        required_create: flag("requiredCreate")?,
        required_update: flag("requiredUpdate")?,
        required_put: flag("requiredPut")?,
        required_patch: flag("requiredPatch")?,
        min: bound("min")?,
        max: bound("max")?,
        min_length: length("minLength")?,
        max_length: length("maxLength")?,
        integer: flag("integer")?,
        default: descriptor
            .get("default")
            .map(|value| DefaultValue::Literal(FieldValue::from_json(value))),
        value: descriptor.get("value").map(FieldValue::from_json),
        ..FieldSpec::default()
    };
    for (key, verb) in [
        ("canFind", Verb::Find),
        ("canGet", Verb::Get),
        ("canCreate", Verb::Create),
        ("canPut", Verb::Update),
        ("canPatch", Verb::Patch),
        ("canRemove", Verb::Remove),
    ] {
        if let Some(allowed) = optional_flag(key)? {
            spec = spec.can(verb, allowed);
        }
    }
    Ok(spec)
}

/// Parse a `type` value, resolving `ref` for entity kinds.
pub fn parse_kind(
    name: &str,
    kind: &Value,
    descriptor: &Map<String, Value>,
    resolver: &dyn EntityResolver,
) -> Result<FieldKind, StructuralError> {
    match kind {
        Value::String(kind) => Ok(match kind.as_str() {
            "string" => FieldKind::Text,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "date" => FieldKind::Temporal,
            "object" => FieldKind::Opaque,
            "entity" => parse_entity_ref(name, descriptor, resolver)?,
            other => FieldKind::Unsupported(other.to_string()),
        }),
        Value::Array(elements) => match elements.as_slice() {
            [element] => Ok(FieldKind::Sequence(Box::new(parse_kind(
                name, element, descriptor, resolver,
            )?))),
            _ => Err(invalid(name, "sequence type must list exactly one element type")),
        },
        _ => Err(invalid(name, "type must be a name or a one-element list")),
    }
}

fn parse_entity_ref(
    name: &str,
    descriptor: &Map<String, Value>,
    resolver: &dyn EntityResolver,
) -> Result<FieldKind, StructuralError> {
    let resolve = |entity: &str| {
        resolver
            .resolve_entity(entity)
            .ok_or_else(|| StructuralError::UnknownEntity(entity.to_string()))
    };
    match descriptor.get("ref") {
        Some(Value::String(entity)) => Ok(FieldKind::Nested(resolve(entity)?)),
        Some(Value::Array(entities)) if !entities.is_empty() => {
            let candidates = entities
                .iter()
                .map(|entity| {
                    entity
                        .as_str()
                        .ok_or_else(|| invalid(name, "ref entries must be entity names"))
                        .and_then(resolve)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FieldKind::OneOf(candidates))
        }
        _ => Err(invalid(name, "entity fields need a ref")),
    }
}

/// Parse YAML text into a JSON value.
pub fn parse_yaml(text: &str) -> Result<Value, StructuralError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| StructuralError::MalformedDocument(e.to_string()))?;
    yaml_to_json_value(&yaml).map_err(StructuralError::MalformedDocument)
}

/// Convert a YAML value into the JSON model used everywhere else.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("number {n} has no JSON form"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = Map::new();
            for (key, value) in map {
                let key = match key {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported key {other:?}")),
                };
                object.insert(key, yaml_to_json_value(value)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

fn invalid(field: &str, reason: &str) -> StructuralError {
    StructuralError::InvalidDescriptor {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
