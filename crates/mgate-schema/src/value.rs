//! # Resolved Values and Materialized Entities
//!
//! After conversion an entity holds no field specifications, only
//! [`FieldValue`]s. Nested entities keep the stable id of their concrete
//! type so polymorphic results can be told apart.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use mgate_core::{coerce, EngineConfig, Temporal};

use crate::entity::SchemaEntity;

/// Largest integer that survives a round trip through `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A resolved field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text.
    Text(String),
    /// A finite or infinite number.
    Number(f64),
    /// A boolean.
    Boolean(bool),
    /// A date, possibly the invalid-date sentinel.
    Temporal(Temporal),
    /// Free-form JSON passed through untouched.
    Opaque(Value),
    /// A sequence; `None` marks an element that resolved to no value.
    Sequence(Vec<Option<FieldValue>>),
    /// A nested, fully converted entity.
    Entity(Entity),
}

impl FieldValue {
    /// Truthiness, used to decide whether a literal default is present.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Boolean(b) => *b,
            Self::Opaque(value) => coerce::is_truthy(value),
            Self::Temporal(_) | Self::Sequence(_) | Self::Entity(_) => true,
        }
    }

    /// Whether this is a passed-through JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Opaque(Value::Null))
    }

    /// Text content, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Date content, if this is a date.
    pub fn as_temporal(&self) -> Option<&Temporal> {
        match self {
            Self::Temporal(t) => Some(t),
            _ => None,
        }
    }

    /// Elements, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[Option<FieldValue>]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Nested entity, if this is one.
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Passed-through JSON, if this is opaque.
    pub fn as_opaque(&self) -> Option<&Value> {
        match self {
            Self::Opaque(value) => Some(value),
            _ => None,
        }
    }

    /// JSON rendering. Integral numbers render as integers, holes as `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => number_to_json(*n),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Temporal(t) => t.to_rfc3339().map(Value::String).unwrap_or(Value::Null),
            Self::Opaque(value) => value.clone(),
            Self::Sequence(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.as_ref().map(FieldValue::to_json).unwrap_or(Value::Null))
                    .collect(),
            ),
            Self::Entity(entity) => entity.to_json(),
        }
    }

    /// Structural copy of raw JSON: scalars map to their typed variants,
    /// arrays to sequences, objects and `null` stay opaque.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null | Value::Object(_) => Self::Opaque(value.clone()),
            Value::Bool(b) => Self::Boolean(*b),
            Value::Number(n) => Self::Number(coerce::number_value(n)),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => {
                Self::Sequence(items.iter().map(|item| Some(Self::from_json(item))).collect())
            }
        }
    }
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Temporal> for FieldValue {
    fn from(t: Temporal) -> Self {
        Self::Temporal(t)
    }
}

impl From<Entity> for FieldValue {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

/// A materialized entity: resolved values in declaration order, tagged with
/// the stable id of the entity type that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    type_id: String,
    fields: Vec<(String, FieldValue)>,
}

impl Entity {
    /// An entity of the given type with no fields.
    pub fn empty(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            fields: Vec::new(),
        }
    }

    /// Stable id of the producing entity type.
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Whether this entity was produced by `T`.
    pub fn is<T: SchemaEntity>(&self) -> bool {
        self.type_id == T::TYPE_ID
    }

    /// Value of a field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Whether the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a field, keeping its position if it already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Remove a field.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let index = self.fields.iter().position(|(field, _)| field == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the entity has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Field names in order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// JSON object of all fields, in order.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect::<Map<String, Value>>(),
        )
    }

    /// Outward view: internal-prefixed fields are dropped (the identifier
    /// field is always kept), as are the names in `ignored`.
    pub fn project(&self, config: &EngineConfig, ignored: &[&str]) -> Value {
        Value::Object(
            self.fields
                .iter()
                .filter(|(name, _)| is_exposed(config, name, ignored))
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect::<Map<String, Value>>(),
        )
    }
}

/// Projection rule shared by [`Entity::project`] and source copies.
pub(crate) fn is_exposed(config: &EngineConfig, name: &str, ignored: &[&str]) -> bool {
    config.is_projected(name) && (name == config.identifier_field || !ignored.contains(&name))
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_keeps_position() {
        let mut entity = Entity::empty("t");
        entity.insert("a", FieldValue::from(1));
        entity.insert("b", FieldValue::from(2));
        let previous = entity.insert("a", FieldValue::from(3));
        assert_eq!(previous, Some(FieldValue::Number(1.0)));
        assert_eq!(entity.field_names(), vec!["a", "b"]);
        assert_eq!(entity.to_json(), json!({"a": 3, "b": 2}));
    }

    #[test]
    fn numbers_render_as_integers_when_integral() {
        assert_eq!(FieldValue::Number(2000.0).to_json(), json!(2000));
        assert_eq!(FieldValue::Number(20.5).to_json(), json!(20.5));
        assert_eq!(FieldValue::Number(f64::NAN).to_json(), Value::Null);
    }

    #[test]
    fn sequence_holes_render_as_null() {
        let seq = FieldValue::Sequence(vec![Some(FieldValue::from("a")), None]);
        assert_eq!(seq.to_json(), json!(["a", null]));
    }

    #[test]
    fn from_json_structural_copy() {
        let value = FieldValue::from_json(&json!([1, "x", {"k": true}]));
        assert_eq!(value.to_json(), json!([1, "x", {"k": true}]));
    }

    #[test]
    fn truthiness_of_literals() {
        assert!(!FieldValue::from(0).is_truthy());
        assert!(!FieldValue::from("").is_truthy());
        assert!(!FieldValue::from(false).is_truthy());
        assert!(!FieldValue::Opaque(Value::Null).is_truthy());
        assert!(FieldValue::from(10).is_truthy());
    }

    #[test]
    fn projection_keeps_identifier_and_drops_internal() {
        let mut entity = Entity::empty("t");
        entity.insert("_id", FieldValue::from(1));
        entity.insert("_secret", FieldValue::from(2));
        entity.insert("name", FieldValue::from("x"));
        entity.insert("b", FieldValue::from(3));
        let view = entity.project(&EngineConfig::default(), &["b"]);
        assert_eq!(view, json!({"_id": 1, "name": "x"}));
    }

    #[test]
    fn serializes_in_declaration_order() {
        let mut entity = Entity::empty("t");
        entity.insert("z", FieldValue::from(1));
        entity.insert("a", FieldValue::from(2));
        assert_eq!(serde_json::to_string(&entity).unwrap(), r#"{"z":1,"a":2}"#);
    }
}
