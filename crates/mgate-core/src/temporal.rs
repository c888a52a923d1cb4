//! # Temporal Values
//!
//! Defines `Temporal`, the resolved value of a date field. Conversion of a
//! date field never fails: integer-like input (`1489309333478`,
//! `"1489309333478"`) is an epoch timestamp in milliseconds, anything else
//! goes through lenient date parsing, and input that cannot be read as a
//! date produces the [`Temporal::Invalid`] sentinel instead of an error.
//! `null` reads as the epoch itself.
//!
//! ## Accepted text forms
//!
//! - RFC 3339 / ISO 8601 with offset (`2014-08-13T10:00:39.399Z`)
//! - ISO 8601 without offset, read as UTC (`2014-08-13T10:00:39`)
//! - Date only, midnight UTC (`2014-08-13`)
//! - RFC 2822 (`Wed, 13 Aug 2014 10:00:39 +0000`)

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::coerce;

/// Largest representable distance from the epoch, in milliseconds.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// A resolved date: either a UTC instant or the invalid-date sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temporal {
    /// A valid UTC instant with millisecond precision.
    Valid(DateTime<Utc>),
    /// Input that could not be read as a date.
    Invalid,
}

impl Temporal {
    /// Build from raw view-model input. Never fails.
    pub fn from_input(value: &Value) -> Self {
        if let Some(millis) = coerce::loose_integer(value) {
            return Self::from_epoch_millis(millis);
        }
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => Self::from_epoch_millis(coerce::number_value(n).trunc()),
            Value::Bool(b) => Self::from_epoch_millis(f64::from(u8::from(*b))),
            Value::Null => Self::from_epoch_millis(0.0),
            Value::Array(_) | Value::Object(_) => Self::parse(&coerce::to_text(value)),
        }
    }

    /// Interpret a number as milliseconds since the Unix epoch.
    pub fn from_epoch_millis(millis: f64) -> Self {
        if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
            return Self::Invalid;
        }
        DateTime::from_timestamp_millis(millis.trunc() as i64)
            .map(Self::Valid)
            .unwrap_or(Self::Invalid)
    }

    /// Lenient text parsing; see the module docs for accepted forms.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Self::Valid(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Self::Valid(naive.and_utc());
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Self::Valid(midnight.and_utc());
            }
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Self::Valid(dt.with_timezone(&Utc));
        }
        Self::Invalid
    }

    /// Whether this is a real instant.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Access the inner `DateTime<Utc>`, if valid.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Valid(dt) => Some(dt),
            Self::Invalid => None,
        }
    }

    /// Milliseconds since the Unix epoch, if valid.
    pub fn epoch_millis(&self) -> Option<i64> {
        self.as_datetime().map(DateTime::timestamp_millis)
    }

    /// Render as RFC 3339 with millisecond precision and `Z` suffix.
    pub fn to_rfc3339(&self) -> Option<String> {
        self.as_datetime()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Some(s) => f.write_str(&s),
            None => f.write_str("Invalid Date"),
        }
    }
}

impl Serialize for Temporal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_rfc3339() {
            Some(s) => serializer.serialize_str(&s),
            None => serializer.serialize_none(),
        }
    }
}
