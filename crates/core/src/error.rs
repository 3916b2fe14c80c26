//! Error types for cruddy
//!
//! This module provides unified error handling across the workspace:
//! missing entities, configuration mistakes, service locator lookups,
//! validation rule parsing and configuration file IO.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cruddy
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// No configuration (or an empty one) exists for the entity
    #[error("The configuration for '{0}' does not exist or is empty")]
    EntityNotFound(String),

    /// Attribute not found in an entity collection
    #[error("Attribute '{id}' not found in entity '{entity}'")]
    AttributeNotFound { entity: String, id: String },

    /// Service locator has nothing bound under the identifier
    #[error("Nothing is bound to '{0}'")]
    BindingNotFound(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Required configuration is missing or malformed
    #[error("Invalid configuration for '{entity}': {message}")]
    Configuration { entity: String, message: String },

    /// An attribute's type discriminator has no registered constructor
    #[error("Unknown {key} type '{kind}' in entity '{entity}'")]
    UnknownAttributeType {
        entity: String,
        key: String,
        kind: String,
    },

    /// The same attribute id appears twice within one collection
    #[error("Duplicate {key} item '{id}' in entity '{entity}'")]
    DuplicateAttribute {
        entity: String,
        key: String,
        id: String,
    },

    /// A column cannot be used to order a listing
    #[error("Column '{column}' of entity '{entity}' cannot order data")]
    InvalidOrder { entity: String, column: String },

    /// A validation rule could not be parsed
    #[error("Unknown validation rule: '{0}'")]
    UnknownRule(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParse { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// An attribute or entity could not be rendered as JSON
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create a configuration error for an entity
    pub fn configuration(entity: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::Configuration {
            entity: entity.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::EntityNotFound(_)
                | EngineError::AttributeNotFound { .. }
                | EngineError::BindingNotFound(_)
        )
    }

    /// Check if this error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EngineError::Configuration { .. }
                | EngineError::UnknownAttributeType { .. }
                | EngineError::DuplicateAttribute { .. }
                | EngineError::InvalidOrder { .. }
                | EngineError::UnknownRule(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            EngineError::FileRead { .. } | EngineError::ConfigParse { .. }
        )
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

// ============================================================================
// Tests
// ============================================================================
