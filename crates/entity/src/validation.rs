//! Validation of form input
//!
//! Forms describe their rules the way admin configuration usually does:
//! `email = "required|email|max:255"`. A [`ValidatorFactory`] turns those
//! descriptions into a [`Validator`]; [`RuleValidatorFactory`] is the
//! built-in one.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use cruddy_core::{EngineError, EngineResult, prettify_string};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rules per attribute, as written in configuration
pub type RuleMap = BTreeMap<String, RuleSpec>;

/// Plain string map used for messages and custom attribute names
pub type StringMap = BTreeMap<String, String>;

// ============================================================================
// RuleSpec
// ============================================================================

/// Rules of one attribute as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    /// `"required|email"`
    Pipe(String),
    /// `["required", "email"]`
    List(Vec<String>),
}

impl RuleSpec {
    /// The individual rule strings, empty ones dropped
    pub fn parts(&self) -> Vec<&str> {
        let parts: Vec<&str> = match self {
            RuleSpec::Pipe(rules) => rules.split('|').collect(),
            RuleSpec::List(rules) => rules.iter().map(String::as_str).collect(),
        };
        parts
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect()
    }
}

impl From<&str> for RuleSpec {
    fn from(rules: &str) -> Self {
        RuleSpec::Pipe(rules.to_string())
    }
}

// ============================================================================
// Rule
// ============================================================================

/// A single validation rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    String,
    Email,
    Numeric,
    Integer,
    Boolean,
    Date,
    /// Minimum number, string length or list size
    Min(f64),
    /// Maximum number, string length or list size
    Max(f64),
    /// Value must be one of the listed ones
    In(Vec<String>),
}

impl Rule {
    /// Rule name, as used in configuration and message keys
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::String => "string",
            Rule::Email => "email",
            Rule::Numeric => "numeric",
            Rule::Integer => "integer",
            Rule::Boolean => "boolean",
            Rule::Date => "date",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::In(_) => "in",
        }
    }

    /// Check a value; every rule except `required` accepts a missing value
    pub fn check(&self, value: Option<&Value>) -> bool {
        let value = match value {
            Some(value) if !is_missing(value) => value,
            _ => return *self != Rule::Required,
        };

        match self {
            Rule::Required => !matches!(value, Value::Array(items) if items.is_empty()),
            Rule::String => value.is_string(),
            Rule::Email => value.as_str().is_some_and(is_email),
            Rule::Numeric => number(value).is_some(),
            Rule::Integer => match value {
                Value::Number(n) => n.is_i64() || n.is_u64(),
                Value::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            Rule::Boolean => {
                value.is_boolean()
                    || matches!(value.as_i64(), Some(0 | 1))
                    || matches!(value.as_str(), Some("0" | "1" | "true" | "false"))
            }
            Rule::Date => value.as_str().is_some_and(is_date),
            Rule::Min(min) => size(value).is_some_and(|size| size >= *min),
            Rule::Max(max) => size(value).is_some_and(|size| size <= *max),
            Rule::In(allowed) => scalar(value).is_some_and(|v| allowed.contains(&v)),
        }
    }

    fn default_message(&self) -> &'static str {
        match self {
            Rule::Required => "The :attribute field is required.",
            Rule::String => "The :attribute must be a string.",
            Rule::Email => "The :attribute must be a valid email address.",
            Rule::Numeric => "The :attribute must be a number.",
            Rule::Integer => "The :attribute must be an integer.",
            Rule::Boolean => "The :attribute field must be true or false.",
            Rule::Date => "The :attribute is not a valid date.",
            Rule::Min(_) => "The :attribute must be at least :min.",
            Rule::Max(_) => "The :attribute may not be greater than :max.",
            Rule::In(_) => "The selected :attribute is invalid.",
        }
    }
}

impl FromStr for Rule {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, parameters) = match s.split_once(':') {
            Some((name, parameters)) => (name.trim(), Some(parameters.trim())),
            None => (s.trim(), None),
        };
        let unknown = || EngineError::UnknownRule(s.to_string());
        let bound = || -> EngineResult<f64> {
            parameters
                .and_then(|p| p.parse::<f64>().ok())
                .ok_or_else(unknown)
        };

        let rule = match (name, parameters) {
            ("required", None) => Rule::Required,
            ("string", None) => Rule::String,
            ("email", None) => Rule::Email,
            ("numeric", None) => Rule::Numeric,
            ("integer", None) => Rule::Integer,
            ("boolean", None) => Rule::Boolean,
            ("date", None) => Rule::Date,
            ("min", Some(_)) => Rule::Min(bound()?),
            ("max", Some(_)) => Rule::Max(bound()?),
            ("in", Some(values)) => Rule::In(
                values
                    .split(',')
                    .map(|value| value.trim().to_string())
                    .collect(),
            ),
            _ => return Err(unknown()),
        };
        Ok(rule)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Min(n) | Rule::Max(n) => write!(f, "{}:{}", self.name(), n),
            Rule::In(values) => write!(f, "in:{}", values.join(",")),
            _ => f.write_str(self.name()),
        }
    }
}

// ============================================================================
// ValidationErrors
// ============================================================================

/// Failed rules, as rendered messages per attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("{} attribute(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Record a message for an attribute
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(attribute.into())
            .or_default()
            .push(message.into());
    }

    /// Messages per attribute
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// First message of an attribute
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.errors
            .get(attribute)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Whether any attribute failed
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed attributes
    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

// ============================================================================
// Validator
// ============================================================================

/// Parsed rules plus the messages used to report failures
#[derive(Debug, Clone, Default)]
pub struct Validator {
    data: Map<String, Value>,
    rules: BTreeMap<String, Vec<Rule>>,
    messages: StringMap,
    custom_attributes: StringMap,
}

impl Validator {
    /// Create a validator
    pub fn new(
        data: Map<String, Value>,
        rules: BTreeMap<String, Vec<Rule>>,
        messages: StringMap,
        custom_attributes: StringMap,
    ) -> Self {
        Self {
            data,
            rules,
            messages,
            custom_attributes,
        }
    }

    /// Rules per attribute
    pub fn rules(&self) -> &BTreeMap<String, Vec<Rule>> {
        &self.rules
    }

    /// Rules of one attribute
    pub fn rules_for(&self, attribute: &str) -> &[Rule] {
        self.rules.get(attribute).map_or(&[], Vec::as_slice)
    }

    /// Message overrides
    pub fn messages(&self) -> &StringMap {
        &self.messages
    }

    /// Display names of attributes used in messages
    pub fn custom_attributes(&self) -> &StringMap {
        &self.custom_attributes
    }

    /// The data bound to the validator
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Bind data
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Whether the bound data passes every rule
    pub fn passes(&self) -> bool {
        self.validate(&self.data).is_ok()
    }

    /// Check input against every rule
    pub fn validate(&self, input: &Map<String, Value>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for (attribute, rules) in &self.rules {
            let value = input.get(attribute);
            for rule in rules {
                if !rule.check(value) {
                    errors.add(attribute, self.message(attribute, rule));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn message(&self, attribute: &str, rule: &Rule) -> String {
        let template = self
            .messages
            .get(&format!("{}.{}", attribute, rule.name()))
            .or_else(|| self.messages.get(rule.name()))
            .map_or(rule.default_message(), String::as_str);

        let name = self
            .custom_attributes
            .get(attribute)
            .cloned()
            .unwrap_or_else(|| prettify_string(attribute));

        let mut message = template.replace(":attribute", &name);
        match rule {
            Rule::Min(n) => message = message.replace(":min", &n.to_string()),
            Rule::Max(n) => message = message.replace(":max", &n.to_string()),
            Rule::In(values) => message = message.replace(":values", &values.join(", ")),
            _ => {}
        }
        message
    }
}

// ============================================================================
// ValidatorFactory
// ============================================================================

/// Builds validators from configured rules
pub trait ValidatorFactory: Send + Sync + fmt::Debug {
    /// Create a validator
    fn make(
        &self,
        data: Map<String, Value>,
        rules: &RuleMap,
        messages: &StringMap,
        custom_attributes: &StringMap,
    ) -> EngineResult<Validator>;
}

/// Validator factory understanding the built-in [`Rule`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidatorFactory;

impl ValidatorFactory for RuleValidatorFactory {
    fn make(
        &self,
        data: Map<String, Value>,
        rules: &RuleMap,
        messages: &StringMap,
        custom_attributes: &StringMap,
    ) -> EngineResult<Validator> {
        let rules = rules
            .iter()
            .map(|(attribute, spec)| {
                let parsed = spec
                    .parts()
                    .into_iter()
                    .map(str::parse)
                    .collect::<EngineResult<Vec<Rule>>>()?;
                Ok((attribute.clone(), parsed))
            })
            .collect::<EngineResult<BTreeMap<_, _>>>()?;

        Ok(Validator::new(
            data,
            rules,
            messages.clone(),
            custom_attributes.clone(),
        ))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn size(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        _ => None,
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
}

// ============================================================================
// Tests
// ============================================================================
