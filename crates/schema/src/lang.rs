//! Translation contract and per-entity translation scope
//!
//! Attributes never own their entity. Instead each attribute carries an
//! [`EntityScope`]: the owning entity's id plus a shared translator, which
//! is all an attribute needs to resolve its labels and help lines.

use cruddy_core::{EngineError, EngineResult, EntityId};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Translator
// ============================================================================

/// A source of translated lines addressed by dotted keys
pub trait Translator: Send + Sync + fmt::Debug {
    /// Get the line for a key, if one exists
    fn get(&self, key: &str) -> Option<String>;

    /// Get the line for a key, falling back to `default` when missing
    fn translate(&self, key: &str, default: Option<&str>) -> Option<String> {
        self.get(key).or_else(|| default.map(str::to_owned))
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// In-memory translator backed by a flat map of dotted keys
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    lines: HashMap<String, String>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a nested tree of tables
    ///
    /// `{"users": {"fields": {"email": "E-mail"}}}` becomes the single line
    /// `users.fields.email`.
    pub fn from_value(value: &Value) -> Self {
        let mut catalog = Self::new();
        catalog.flatten(None, value);
        catalog
    }

    /// Load a catalog from a `.toml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&text).map_err(|e| EngineError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?,
            _ => toml::from_str(&text).map_err(|e| EngineError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?,
        };

        let catalog = Self::from_value(&value);
        tracing::debug!(
            "Loaded {} translation line(s) from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Add a line
    pub fn insert(&mut self, key: impl Into<String>, line: impl Into<String>) {
        self.lines.insert(key.into(), line.into());
    }

    /// Add a line using builder pattern
    pub fn with_line(mut self, key: impl Into<String>, line: impl Into<String>) -> Self {
        self.insert(key, line);
        self
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the catalog has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn flatten(&mut self, prefix: Option<&str>, value: &Value) {
        let join = |key: &str| match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.to_string(),
        };

        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    self.flatten(Some(&join(key)), value);
                }
            }
            Value::String(line) => {
                if let Some(prefix) = prefix {
                    self.insert(prefix, line.clone());
                }
            }
            Value::Number(_) | Value::Bool(_) => {
                if let Some(prefix) = prefix {
                    self.insert(prefix, value.to_string());
                }
            }
            Value::Null | Value::Array(_) => {}
        }
    }
}

impl Translator for Catalog {
    fn get(&self, key: &str) -> Option<String> {
        self.lines.get(key).cloned()
    }
}

// ============================================================================
// EntityScope
// ============================================================================

/// Non-owning link from an attribute to the entity that owns it
#[derive(Debug, Clone)]
pub struct EntityScope {
    entity_id: EntityId,
    translator: Arc<dyn Translator>,
}

impl EntityScope {
    /// Create a scope for an entity
    pub fn new(entity_id: impl Into<EntityId>, translator: Arc<dyn Translator>) -> Self {
        Self {
            entity_id: entity_id.into(),
            translator,
        }
    }

    /// Create a scope with no translations at all
    pub fn untranslated(entity_id: impl Into<EntityId>) -> Self {
        Self::new(entity_id, Arc::new(Catalog::new()))
    }

    /// Id of the owning entity
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The shared translator
    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    /// Translate a key under this entity's namespace (`{entity}.{key}`)
    pub fn translate(&self, key: &str, default: Option<&str>) -> Option<String> {
        self.translator
            .translate(&format!("{}.{}", self.entity_id, key), default)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_flattens_tree() {
        let catalog = Catalog::from_value(&json!({
            "users": {
                "title": "Users",
                "fields": { "email": "E-mail", "age": 18 },
                "ignored": ["a", "b"]
            }
        }));

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("users.title").as_deref(), Some("Users"));
        assert_eq!(catalog.get("users.fields.email").as_deref(), Some("E-mail"));
        assert_eq!(catalog.get("users.fields.age").as_deref(), Some("18"));
        assert_eq!(catalog.get("users.ignored"), None);
    }

    #[test]
    fn test_translate_default_policy() {
        let catalog = Catalog::new().with_line("a", "A");
        assert_eq!(catalog.translate("a", Some("x")).as_deref(), Some("A"));
        assert_eq!(catalog.translate("b", Some("x")).as_deref(), Some("x"));
        assert_eq!(catalog.translate("b", None), None);
    }

    #[test]
    fn test_scope_is_per_entity() {
        let catalog: Arc<dyn Translator> = Arc::new(
            Catalog::new()
                .with_line("users.fields.name", "Full name")
                .with_line("tags.fields.name", "Tag"),
        );

        let users = EntityScope::new("users", catalog.clone());
        let tags = EntityScope::new("tags", catalog);

        assert_eq!(users.translate("fields.name", None).as_deref(), Some("Full name"));
        assert_eq!(tags.translate("fields.name", None).as_deref(), Some("Tag"));
        assert_eq!(tags.translate("fields.slug", Some("Slug")).as_deref(), Some("Slug"));
    }

    #[test]
    fn test_catalog_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lang.toml");
        std::fs::write(&path, "[users.fields]\nemail = \"E-mail\"\n").unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.get("users.fields.email").as_deref(), Some("E-mail"));
    }

    #[test]
    fn test_catalog_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lang.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Catalog::load(&path).unwrap_err();
        assert!(err.is_io());
    }
}
