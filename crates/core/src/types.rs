//! Core types used throughout cruddy
//!
//! This module contains the small value types shared by the schema and
//! entity crates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of an entity (the configuration key, e.g. `"users"`)
pub type EntityId = String;

/// Identifier of an attribute, unique within its collection
pub type AttributeId = String;

// ============================================================================
// Sort Direction
// ============================================================================

/// Direction of an order clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// The opposite direction
    pub fn reverse(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(EngineError::internal(format!(
                "'{}' is not a sort direction",
                other
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

// ============================================================================
// Permission Actions
// ============================================================================

/// Actions a user may be permitted to perform on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Every action, in display order
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Update, Action::Delete];

    /// Lowercase name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Configuration Values
// ============================================================================

/// Check whether a configuration value counts as "empty".
///
/// Null, `false`, `0`, `""`, `"0"` and empty arrays or objects are empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

// ============================================================================
// Tests
// ============================================================================
