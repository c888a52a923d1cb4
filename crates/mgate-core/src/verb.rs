//! # Operation Verbs
//!
//! A verb names the logical operation a conversion serves. It gates which
//! fields participate (visibility flags) and which fields must be present
//! (per-verb required flags).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

/// The operation context of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// Listing / querying.
    Find,
    /// Fetching a single record.
    Get,
    /// Creating a record.
    Create,
    /// Full replacement of a record (PUT).
    Update,
    /// Partial update of a record.
    Patch,
    /// Deleting a record.
    Remove,
    /// No particular operation; every field participates.
    #[default]
    Any,
}

impl Verb {
    /// All verbs, in declaration order.
    pub const ALL: [Verb; 7] = [
        Self::Find,
        Self::Get,
        Self::Create,
        Self::Update,
        Self::Patch,
        Self::Remove,
        Self::Any,
    ];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Remove => "remove",
            Self::Any => "any",
        }
    }

    /// Whether `required_update` applies under this verb.
    pub fn is_update_like(&self) -> bool {
        matches!(self, Self::Update | Self::Patch)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = StructuralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "find" => Ok(Self::Find),
            "get" => Ok(Self::Get),
            "create" => Ok(Self::Create),
            "update" | "put" => Ok(Self::Update),
            "patch" => Ok(Self::Patch),
            "remove" => Ok(Self::Remove),
            "any" | "" => Ok(Self::Any),
            _ => Err(StructuralError::UnknownVerb(s.to_string())),
        }
    }
}
