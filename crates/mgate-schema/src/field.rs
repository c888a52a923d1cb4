//! # Field Specifications
//!
//! A [`FieldSpec`] is the declarative rule set for one field: its
//! [`FieldKind`], the verbs it participates in, the verbs that require it,
//! numeric and length bounds, and an optional default or fixed value.
//!
//! A spec without a kind is inert: the engine never touches it and it
//! never appears in a converted entity.

use std::fmt;
use std::sync::Arc;

use mgate_core::Verb;

use crate::entity::{EntityRef, SchemaEntity};
use crate::value::FieldValue;

/// What a field holds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Text, optionally length-bounded.
    Text,
    /// A number, optionally bounded and optionally restricted to integers.
    Number,
    /// A boolean.
    Boolean,
    /// A date.
    Temporal,
    /// Free-form JSON, passed through.
    Opaque,
    /// A sequence of elements of the inner kind.
    Sequence(Box<FieldKind>),
    /// A nested entity of one type.
    Nested(EntityRef),
    /// A nested entity of one of several types, chosen by discriminator.
    OneOf(Vec<EntityRef>),
    /// A kind this engine does not know; always resolves to no value.
    Unsupported(String),
}

impl FieldKind {
    /// The declared entity candidates, if this kind is entity-valued.
    pub fn entity_candidates(&self) -> Option<&[EntityRef]> {
        match self {
            Self::Nested(entity) => Some(std::slice::from_ref(entity)),
            Self::OneOf(candidates) => Some(candidates),
            _ => None,
        }
    }

    /// Short name used in logs and descriptors.
    pub fn name(&self) -> String {
        match self {
            Self::Text => "string".to_string(),
            Self::Number => "number".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Temporal => "date".to_string(),
            Self::Opaque => "object".to_string(),
            Self::Sequence(inner) => format!("[{}]", inner.name()),
            Self::Nested(entity) => format!("entity<{}>", entity.id()),
            Self::OneOf(candidates) => format!(
                "entity<{}>",
                candidates.iter().map(EntityRef::id).collect::<Vec<_>>().join("|")
            ),
            Self::Unsupported(name) => name.clone(),
        }
    }
}

/// A default value: a literal or a producer invoked fresh on every use.
#[derive(Clone)]
pub enum DefaultValue {
    /// A fixed literal, cloned on use.
    Literal(FieldValue),
    /// A zero-argument producer.
    Computed(Arc<dyn Fn() -> FieldValue + Send + Sync>),
}

impl DefaultValue {
    /// Wrap a producer.
    pub fn computed(producer: impl Fn() -> FieldValue + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(producer))
    }

    /// Whether this default can stand in for an absent field. Producers
    /// always can; literals only when truthy.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Literal(value) => value.is_truthy(),
            Self::Computed(_) => true,
        }
    }

    /// Produce the default. A `null` result means no value.
    pub fn produce(&self) -> Option<FieldValue> {
        let value = match self {
            Self::Literal(value) => value.clone(),
            Self::Computed(producer) => producer(),
        };
        (!value.is_null()).then_some(value)
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<FieldValue> for DefaultValue {
    fn from(value: FieldValue) -> Self {
        Self::Literal(value)
    }
}

/// Declarative rule set for a single field.
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    pub kind: Option<FieldKind>,
    /// Required under every verb.
    pub required: bool,
    pub required_create: bool,
    /// Required under `Update` and `Patch`.
    pub required_update: bool,
    pub required_put: bool,
    pub required_patch: bool,
    pub can_find: Option<bool>,
    pub can_get: Option<bool>,
    pub can_create: Option<bool>,
    pub can_put: Option<bool>,
    pub can_patch: Option<bool>,
    pub can_remove: Option<bool>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Restrict numbers to exact integers.
    pub integer: bool,
    pub default: Option<DefaultValue>,
    /// Fixed value; always wins over input.
    pub value: Option<FieldValue>,
}

impl FieldSpec {
    /// A spec of the given kind with no modifiers.
    pub fn of(kind: FieldKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// A spec with no kind. Never resolved.
    pub fn inert() -> Self {
        Self::default()
    }

    pub fn text() -> Self {
        Self::of(FieldKind::Text)
    }

    pub fn number() -> Self {
        Self::of(FieldKind::Number)
    }

    /// A number restricted to exact integers.
    pub fn integer() -> Self {
        Self {
            integer: true,
            ..Self::number()
        }
    }

    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    pub fn temporal() -> Self {
        Self::of(FieldKind::Temporal)
    }

    pub fn opaque() -> Self {
        Self::of(FieldKind::Opaque)
    }

    /// A sequence whose elements follow `element`.
    pub fn sequence(element: FieldKind) -> Self {
        Self::of(FieldKind::Sequence(Box::new(element)))
    }

    /// A nested entity of type `T`.
    pub fn nested<T: SchemaEntity>() -> Self {
        Self::of(FieldKind::Nested(EntityRef::of::<T>()))
    }

    /// A nested entity of one of `candidates`.
    pub fn one_of(candidates: Vec<EntityRef>) -> Self {
        Self::of(FieldKind::OneOf(candidates))
    }

    /// Required under every verb.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn required_create(mut self) -> Self {
        self.required_create = true;
        self
    }

    pub fn required_update(mut self) -> Self {
        self.required_update = true;
        self
    }

    pub fn required_put(mut self) -> Self {
        self.required_put = true;
        self
    }

    pub fn required_patch(mut self) -> Self {
        self.required_patch = true;
        self
    }

    /// Set visibility for one verb. `Any` has no flag and is ignored.
    pub fn can(mut self, verb: Verb, allowed: bool) -> Self {
        if let Some(slot) = self.visibility_slot(verb) {
            *slot = Some(allowed);
        }
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Literal default.
    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(DefaultValue::Literal(value.into()));
        self
    }

    /// Default computed fresh on every use.
    pub fn with_default_fn(mut self, producer: impl Fn() -> FieldValue + Send + Sync + 'static) -> Self {
        self.default = Some(DefaultValue::computed(producer));
        self
    }

    /// Fixed value.
    pub fn fixed(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn visibility_slot(&mut self, verb: Verb) -> Option<&mut Option<bool>> {
        match verb {
            Verb::Find => Some(&mut self.can_find),
            Verb::Get => Some(&mut self.can_get),
            Verb::Create => Some(&mut self.can_create),
            Verb::Update => Some(&mut self.can_put),
            Verb::Patch => Some(&mut self.can_patch),
            Verb::Remove => Some(&mut self.can_remove),
            Verb::Any => None,
        }
    }

    /// Whether the field participates under `verb`. Unset flags allow.
    pub fn is_visible(&self, verb: Verb) -> bool {
        let flag = match verb {
            Verb::Any => return true,
            Verb::Find => self.can_find,
            Verb::Get => self.can_get,
            Verb::Create => self.can_create,
            Verb::Update => self.can_put,
            Verb::Patch => self.can_patch,
            Verb::Remove => self.can_remove,
        };
        flag != Some(false)
    }

    /// Whether an absent value is a violation under `verb`.
    pub fn is_required_for(&self, verb: Verb) -> bool {
        self.required
            || (self.required_update && verb.is_update_like())
            || (self.required_put && verb == Verb::Update)
            || (self.required_patch && verb == Verb::Patch)
            || (self.required_create && verb == Verb::Create)
    }

    /// Whether an absent field should still be resolved through its default.
    pub fn has_present_default(&self) -> bool {
        self.default.as_ref().is_some_and(DefaultValue::is_present)
    }

    /// Overlay `newer` onto this spec: set options and raised flags win.
    pub fn merge(&mut self, newer: FieldSpec) {
        fn overlay<T>(slot: &mut Option<T>, newer: Option<T>) {
            if newer.is_some() {
                *slot = newer;
            }
        }
        overlay(&mut self.kind, newer.kind);
        self.required |= newer.required;
        self.required_create |= newer.required_create;
        self.required_update |= newer.required_update;
        self.required_put |= newer.required_put;
        self.required_patch |= newer.required_patch;
        self.integer |= newer.integer;
        overlay(&mut self.can_find, newer.can_find);
        overlay(&mut self.can_get, newer.can_get);
        overlay(&mut self.can_create, newer.can_create);
        overlay(&mut self.can_put, newer.can_put);
        overlay(&mut self.can_patch, newer.can_patch);
        overlay(&mut self.can_remove, newer.can_remove);
        overlay(&mut self.min, newer.min);
        overlay(&mut self.max, newer.max);
        overlay(&mut self.min_length, newer.min_length);
        overlay(&mut self.max_length, newer.max_length);
        overlay(&mut self.default, newer.default);
        overlay(&mut self.value, newer.value);
    }
}
