//! Primitive casting.
//!
//! Turns one raw input value into a [`FieldValue`] according to a
//! [`FieldKind`]. A cast never fails outright: it yields a value, "no value"
//! (the caller may fall back to a default or report a missing field), or
//! the invalid marker (the caller reports `"<field> has invalid data"`).

use serde_json::Value;

use mgate_core::{coerce, Temporal};

use crate::field::{FieldKind, FieldSpec};
use crate::value::FieldValue;

/// Result of casting one input value.
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    Value(FieldValue),
    NoValue,
    Invalid,
}

/// Cast `input` (absent when `None`) by `kind`, applying the bounds of `spec`.
pub fn cast(kind: &FieldKind, input: Option<&Value>, spec: &FieldSpec) -> CastOutcome {
    let input = match (kind, input) {
        (_, None) => return CastOutcome::NoValue,
        (FieldKind::Temporal, Some(value)) => {
            return CastOutcome::Value(FieldValue::Temporal(Temporal::from_input(value)));
        }
        (_, Some(Value::Null)) => return CastOutcome::NoValue,
        (_, Some(value)) => value,
    };
    match kind {
        FieldKind::Text => cast_text(input, spec),
        FieldKind::Number => cast_number(input, spec),
        FieldKind::Boolean => match input {
            Value::Bool(b) => CastOutcome::Value(FieldValue::Boolean(*b)),
            Value::String(s) if s == "true" || s == "1" => CastOutcome::Value(true.into()),
            Value::String(s) if s == "false" || s == "0" => CastOutcome::Value(false.into()),
            Value::Number(n) => match coerce::number_value(n) {
                n if n == 1.0 => CastOutcome::Value(true.into()),
                n if n == 0.0 => CastOutcome::Value(false.into()),
                _ => CastOutcome::NoValue,
            },
            _ => CastOutcome::NoValue,
        },
        FieldKind::Temporal => CastOutcome::Value(FieldValue::Temporal(Temporal::from_input(input))),
        FieldKind::Opaque => CastOutcome::Value(FieldValue::Opaque(input.clone())),
        FieldKind::Sequence(element) => {
            let Value::Array(items) = input else {
                return CastOutcome::NoValue;
            };
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match cast(element, Some(item), spec) {
                    CastOutcome::Value(value) => out.push(Some(value)),
                    CastOutcome::NoValue => out.push(None),
                    CastOutcome::Invalid => return CastOutcome::Invalid,
                }
            }
            CastOutcome::Value(FieldValue::Sequence(out))
        }
        FieldKind::Nested(_) | FieldKind::OneOf(_) | FieldKind::Unsupported(_) => CastOutcome::NoValue,
    }
}

fn cast_text(input: &Value, spec: &FieldSpec) -> CastOutcome {
    let text = coerce::to_text(input);
    let length = text.chars().count();
    let too_short = spec.min_length.is_some_and(|min| length < min);
    let too_long = spec.max_length.is_some_and(|max| length > max);
    if too_short || too_long {
        CastOutcome::Invalid
    } else {
        CastOutcome::Value(FieldValue::Text(text))
    }
}

fn cast_number(input: &Value, spec: &FieldSpec) -> CastOutcome {
    let parsed = if spec.integer {
        coerce::loose_integer(input)
    } else {
        coerce::loose_float(input)
    };
    let Some(n) = parsed else {
        return CastOutcome::NoValue;
    };
    let below = spec.min.is_some_and(|min| n < min);
    let above = spec.max.is_some_and(|max| n > max);
    if below || above {
        CastOutcome::Invalid
    } else {
        CastOutcome::Value(FieldValue::Number(n))
    }
}
