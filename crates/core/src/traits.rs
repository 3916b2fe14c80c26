//! Core traits for cruddy
//!
//! This module defines the traits that entities and attributes implement
//! to provide consistent validation and serialization behavior.

use crate::error::EngineResult;
use serde_json::{Map, Value};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return an error if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use cruddy_core::{Validatable, EngineResult, EngineError};
///
/// struct Listing {
///     per_page: usize,
/// }
///
/// impl Validatable for Listing {
///     fn validate(&self) -> EngineResult<()> {
///         if self.per_page == 0 {
///             return Err(EngineError::configuration("posts", "per_page must be positive"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or an `EngineError` describing the problem.
    fn validate(&self) -> EngineResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// ============================================================================
// Arrayable Trait
// ============================================================================

/// Trait for types serialized into the dictionary consumed by the UI layer
///
/// The map keeps insertion order, so implementors control the key order
/// of the rendered JSON.
pub trait Arrayable {
    /// Serialize into a key/value map
    fn to_array(&self) -> Map<String, Value>;

    /// Serialize into a JSON object
    fn to_json(&self) -> Value {
        Value::Object(self.to_array())
    }

    /// Render as JSON text
    fn to_json_string(&self, pretty: bool) -> EngineResult<String> {
        let json = self.to_json();
        let text = if pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        Ok(text)
    }
}

// ============================================================================
// Tests
// ============================================================================
