//! # Loose Scalar Coercion
//!
//! View models arrive as untyped JSON produced by browsers and scripting
//! clients, where `"2000"`, `2000` and `2000.0` all mean the same number.
//! The helpers here define how such input is read as text, as numbers, and
//! how a parsed number is compared back against the raw input ("loose
//! equality"). The cast rules of the conversion engine are built from them.
//!
//! Rules, summarized:
//!
//! - Text form: numbers print without a trailing `.0` when integral and in
//!   exponent form (`1e+21`, `1e-7`) outside `[1e-6, 1e21)`, arrays
//!   join their elements with `,` (null elements print empty), objects
//!   print as `[object Object]`.
//! - Numeric form: trimmed strings, empty string → 0, `Infinity`, `0x`/`0o`/`0b`
//!   prefixes, booleans → 0/1. Anything else is not a number.
//! - `parse_int` / `parse_float` read the longest numeric *prefix* of the
//!   text form, so `"12px"` parses as 12. Loose equality then rejects it
//!   because `"12px"` itself is not numerically 12.

use serde_json::{Number, Value};

/// Read a JSON number as `f64`.
pub fn number_value(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

/// Render a number the way a dynamic runtime prints it.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        }
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// Text form of an arbitrary JSON value.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(number_value(n)),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => {
            let n = number_value(n);
            n != 0.0 && !n.is_nan()
        }
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric form of a string; `NaN` when it is not a complete number.
pub fn text_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }
    // `str::parse::<f64>` also accepts "inf" and "nan"; only plain decimal
    // literals are numbers here.
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Numeric form of a JSON value, or `None` when it has none.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Null => return None,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => number_value(n),
        Value::String(s) => text_to_number(s),
        Value::Array(_) => text_to_number(&to_text(value)),
        Value::Object(_) => return None,
    };
    (!n.is_nan()).then_some(n)
}

/// Loose equality between a parsed number and the raw input it came from.
///
/// `null` equals no number; `NaN` equals nothing.
pub fn loosely_equals(n: f64, raw: &Value) -> bool {
    to_number(raw).is_some_and(|m| m == n)
}

/// Longest base-10 integer prefix of the value's text form.
pub fn parse_int(value: &Value) -> Option<f64> {
    let text = to_text(value);
    let s = text.trim_start();
    let (negative, rest) = split_sign(s);
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<f64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Longest decimal floating-point prefix of the value's text form.
pub fn parse_float(value: &Value) -> Option<f64> {
    let text = to_text(value);
    let s = text.trim_start();
    let (negative, rest) = split_sign(s);
    if rest.starts_with("Infinity") {
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let bytes = rest.as_bytes();
    let mut end = 0;
    let mut int_digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        int_digits += 1;
    }
    let mut frac_digits = 0;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut cursor = end + 1;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
            frac_digits += 1;
        }
        if int_digits > 0 || frac_digits > 0 {
            end = cursor;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut cursor = end + 1;
        if cursor < bytes.len() && matches!(bytes[cursor], b'+' | b'-') {
            cursor += 1;
        }
        let exp_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if cursor > exp_start {
            end = cursor;
        }
    }

    let magnitude = rest[..end].parse::<f64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// An exact integer that loosely equals the raw input (`"2000"`, `2000`, `2000.0`).
pub fn loose_integer(value: &Value) -> Option<f64> {
    parse_int(value).filter(|n| n.is_finite() && loosely_equals(*n, value))
}

/// A float that loosely equals the raw input (`"20.5"`, `20.5`, `"1e3"`).
pub fn loose_float(value: &Value) -> Option<f64> {
    parse_float(value).filter(|n| loosely_equals(*n, value))
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// Every i32, as number or as decimal text, is read back as itself.
        #[test]
        fn integers_are_loose_integers(n in any::<i32>()) {
            prop_assert_eq!(loose_integer(&json!(n)), Some(f64::from(n)));
            prop_assert_eq!(loose_integer(&json!(n.to_string())), Some(f64::from(n)));
        }

        /// Text that is not purely numeric never loosely equals its prefix.
        #[test]
        fn suffixed_text_is_rejected(n in any::<u16>(), suffix in "[a-z]{1,4}") {
            let raw = json!(format!("{n}{suffix}"));
            prop_assert_eq!(loose_float(&raw), None);
            prop_assert_eq!(loose_integer(&raw), None);
        }
    }
}
