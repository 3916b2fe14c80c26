//! Form processors
//!
//! A form pairs the model an entity edits with the validator checking the
//! submitted input. Entities usually describe their form as a table and get
//! the generic [`Form`]; a custom [`FormProcessor`] can be bound in the
//! [`Container`](crate::container::Container) and named instead.

use crate::validation::{RuleMap, StringMap, ValidationErrors, Validator};
use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Model
// ============================================================================

/// The persistent model behind an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    class: String,
    table: String,
    key_name: String,
}

impl Model {
    /// Create a model stored in `table`, keyed by `id`
    pub fn new(class: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            table: table.into(),
            key_name: "id".to_string(),
        }
    }

    /// Create a model whose table is derived from the class name:
    /// `App\Models\BlogPost` is stored in `blog_posts`
    pub fn from_class(class: impl Into<String>) -> Self {
        let class = class.into();
        let base = class
            .rsplit(['\\', ':', '.'])
            .next()
            .unwrap_or(class.as_str());
        let table = pluralize(&base.to_snake_case());
        Self::new(class, table)
    }

    /// Set the primary key column
    pub fn with_key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = key_name.into();
        self
    }

    /// Model class identifier
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Primary key column
    pub fn key_name(&self) -> &str {
        &self.key_name
    }
}

// ============================================================================
// FormProcessor
// ============================================================================

/// Anything able to process an entity form
pub trait FormProcessor: Send + Sync + fmt::Debug {
    /// The edited model
    fn model(&self) -> &Model;

    /// The validator checking submitted input
    fn validator(&self) -> &Validator;

    /// Check submitted input
    fn validate(&self, input: &Map<String, Value>) -> Result<(), ValidationErrors> {
        self.validator().validate(input)
    }
}

/// Generic form built from a [`FormDefinition`]
#[derive(Debug, Clone)]
pub struct Form {
    model: Arc<Model>,
    validator: Validator,
}

impl Form {
    /// Pair a model with a validator
    pub fn new(model: Arc<Model>, validator: Validator) -> Self {
        Self { model, validator }
    }
}

impl FormProcessor for Form {
    fn model(&self) -> &Model {
        &self.model
    }

    fn validator(&self) -> &Validator {
        &self.validator
    }
}

// ============================================================================
// FormDefinition
// ============================================================================

/// Form configured as a table
///
/// ```toml
/// [form]
/// model = "App\\User"
///
/// [form.rules]
/// email = "required|email"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    /// Container identifier of the model
    pub model: String,

    /// Rules per attribute
    #[serde(default)]
    pub rules: RuleMap,

    /// Message overrides, keyed `rule` or `attribute.rule`
    #[serde(default)]
    pub messages: StringMap,

    /// Display names of attributes used in messages
    #[serde(default, alias = "custom_attributes")]
    pub custom_attributes: StringMap,
}

fn pluralize(snake: &str) -> String {
    if snake.ends_with('s') || snake.ends_with('x') || snake.ends_with("ch") || snake.ends_with("sh")
    {
        format!("{}es", snake)
    } else if snake.ends_with('y')
        && !snake.ends_with("ey")
        && !snake.ends_with("ay")
        && !snake.ends_with("oy")
    {
        format!("{}ies", &snake[..snake.len() - 1])
    } else {
        format!("{}s", snake)
    }
}

// ============================================================================
// Tests
// ============================================================================
