//! Configuration repository
//!
//! Configuration is a set of namespaced trees addressed by
//! `"namespace::dotted.path"` keys. Entity definitions live in the
//! `entities` namespace, one top-level table per entity id, usually loaded
//! from a directory holding one `{id}.toml` or `{id}.json` file per entity.

use cruddy_core::{EngineError, EngineResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

/// Namespace holding entity definitions
pub const ENTITIES_NAMESPACE: &str = "entities";

// ============================================================================
// ConfigSource
// ============================================================================

/// Key/value store addressed by namespaced dotted paths
pub trait ConfigSource: Send + Sync + fmt::Debug {
    /// Get the value at `"namespace::dotted.path"`
    fn get(&self, key: &str) -> Option<Value>;

    /// Top-level keys of a namespace, in definition order
    fn keys(&self, namespace: &str) -> Vec<String>;
}

// ============================================================================
// ConfigRepository
// ============================================================================

/// In-memory [`ConfigSource`]
#[derive(Debug, Clone, Default)]
pub struct ConfigRepository {
    namespaces: HashMap<String, Map<String, Value>>,
}

impl ConfigRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a namespace with a tree; anything but a table leaves it empty
    pub fn with_namespace(mut self, namespace: impl Into<String>, tree: Value) -> Self {
        let namespace = namespace.into();
        let tree = match tree {
            Value::Object(map) => map,
            other => {
                tracing::warn!(
                    "Configuration namespace '{}' must be a table, got {}",
                    namespace,
                    other
                );
                Map::new()
            }
        };
        self.namespaces.insert(namespace, tree);
        self
    }

    /// Set a top-level key of a namespace
    pub fn insert(&mut self, namespace: &str, key: impl Into<String>, value: Value) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.into(), value);
    }

    /// Load every `.toml` and `.json` file of a directory into a namespace,
    /// keyed by file stem. Returns the number of files loaded.
    pub fn load_dir(&mut self, namespace: &str, dir: impl AsRef<Path>) -> EngineResult<usize> {
        let dir = dir.as_ref();
        let mut loaded = 0;

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| EngineError::FileRead {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let value = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => parse_toml(path)?,
                Some("json") => parse_json(path)?,
                _ => {
                    tracing::debug!("Skipping {}", path.display());
                    continue;
                }
            };

            // Keys are addressed by dotted paths
            if id.contains('.') {
                return Err(EngineError::configuration(
                    id,
                    format!("entity id must not contain '.' (from {})", path.display()),
                ));
            }

            let tree = self.namespaces.entry(namespace.to_string()).or_default();
            if tree.contains_key(id) {
                return Err(EngineError::configuration(
                    id,
                    format!("defined more than once (again in {})", path.display()),
                ));
            }
            tree.insert(id.to_string(), value);
            loaded += 1;
        }

        tracing::info!(
            "Loaded {} '{}' definition(s) from {}",
            loaded,
            namespace,
            dir.display()
        );
        Ok(loaded)
    }

    /// Create a repository with the `entities` namespace loaded from a directory
    pub fn from_entities_dir(dir: impl AsRef<Path>) -> EngineResult<Self> {
        let mut repository = Self::new();
        repository.load_dir(ENTITIES_NAMESPACE, dir)?;
        Ok(repository)
    }
}

impl ConfigSource for ConfigRepository {
    fn get(&self, key: &str) -> Option<Value> {
        let (namespace, path) = key.split_once("::").unwrap_or(("", key));
        let tree = self.namespaces.get(namespace)?;

        let mut segments = path.split('.');
        let mut current = tree.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current.clone())
    }

    fn keys(&self, namespace: &str) -> Vec<String> {
        self.namespaces
            .get(namespace)
            .map(|tree| tree.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn parse_toml(path: &Path) -> EngineResult<Value> {
    let text = read(path)?;
    toml::from_str(&text).map_err(|e| EngineError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn parse_json(path: &Path) -> EngineResult<Value> {
    let text = read(path)?;
    serde_json::from_str(&text).map_err(|e| EngineError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read(path: &Path) -> EngineResult<String> {
    std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repository() -> ConfigRepository {
        ConfigRepository::new().with_namespace(
            ENTITIES_NAMESPACE,
            json!({
                "users": {
                    "fields": { "email": "email" },
                    "form": { "model": "App\\User", "rules": { "email": "required" } },
                    "tags": ["a", "b"],
                },
                "posts": { "fields": ["title"] },
            }),
        )
    }

    #[test]
    fn test_get_dotted_paths() {
        let repository = repository();

        assert_eq!(
            repository.get("entities::users.fields"),
            Some(json!({ "email": "email" }))
        );
        assert_eq!(
            repository.get("entities::users.form.model"),
            Some(json!("App\\User"))
        );
        assert_eq!(repository.get("entities::users.tags.1"), Some(json!("b")));
    }

    #[test]
    fn test_get_missing_paths() {
        let repository = repository();

        assert_eq!(repository.get("entities::comments"), None);
        assert_eq!(repository.get("entities::users.columns"), None);
        assert_eq!(repository.get("entities::users.form.model.deeper"), None);
        assert_eq!(repository.get("entities::users.tags.x"), None);
        assert_eq!(repository.get("other::users"), None);
        assert_eq!(repository.get("users"), None);
    }

    #[test]
    fn test_keys_keep_definition_order() {
        assert_eq!(repository().keys(ENTITIES_NAMESPACE), vec!["users", "posts"]);
        assert!(repository().keys("missing").is_empty());
    }

    #[test]
    fn test_insert_and_default_namespace() {
        let mut repository = ConfigRepository::new();
        repository.insert("", "app", json!({ "name": "admin" }));
        assert_eq!(repository.get("app.name"), Some(json!("admin")));
    }

    #[test]
    fn test_non_table_namespace_is_empty() {
        let repository = ConfigRepository::new().with_namespace("entities", json!([1, 2]));
        assert!(repository.keys("entities").is_empty());
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("users.toml"),
            "[fields]\nname = \"string\"\nemail = \"email\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("posts.json"), r#"{"fields": ["title"]}"#).unwrap();
        std::fs::write(dir.path().join("README.md"), "not configuration").unwrap();

        let repository = ConfigRepository::from_entities_dir(dir.path()).unwrap();

        assert_eq!(repository.keys(ENTITIES_NAMESPACE), vec!["posts", "users"]);
        let fields = repository.get("entities::users.fields").unwrap();
        let ids: Vec<_> = fields.as_object().unwrap().keys().cloned().collect();
        assert_eq!(ids, vec!["name", "email"]);
    }

    #[test]
    fn test_load_dir_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.json"), r#"{"fields": ["a"]}"#).unwrap();
        std::fs::write(dir.path().join("users.toml"), "fields = [\"a\"]\n").unwrap();

        let err = ConfigRepository::from_entities_dir(dir.path()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_load_dir_rejects_dotted_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blog.posts.toml"), "fields = [\"title\"]\n").unwrap();

        let err = ConfigRepository::from_entities_dir(dir.path()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("blog.posts"));
    }

    #[test]
    fn test_load_dir_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.toml"), "fields = [").unwrap();

        let err = ConfigRepository::from_entities_dir(dir.path()).unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigRepository::from_entities_dir(dir.path().join("nope")).unwrap_err();
        assert!(err.is_io());
    }
}
