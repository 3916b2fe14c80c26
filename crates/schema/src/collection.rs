//! Attribute collections and the factories that build them
//!
//! An [`AttributeFactory`] is a registration table from a type
//! discriminator (`"string"`, `"proto"`, ...) to a constructor. It turns the
//! raw per-item configuration of one entity key (`fields`, `columns`,
//! `related`) into an ordered [`Collection`].

use crate::attribute::{AttributeBuilder, SchemaAttribute};
use crate::lang::EntityScope;
use cruddy_core::{EngineError, EngineResult};
use serde_json::{Map, Value};
use std::collections::HashMap;

// ============================================================================
// Collection
// ============================================================================

/// Insertion-ordered attributes with unique ids
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: SchemaAttribute> Collection<T> {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item; hands it back if its id is already taken
    pub fn try_push(&mut self, item: T) -> Result<(), T> {
        if self.contains(item.id()) {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    /// Get an item by id
    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Check if an item with the id exists
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    /// Item ids in order
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id()).collect()
    }

    /// Iterate over the items
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Items that are not hidden
    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|item| !item.is_hidden())
    }

    /// Items that can order data
    pub fn orderable(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|item| item.can_order())
    }

    /// The first item
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize every item into a JSON array
    pub fn to_value(&self) -> Value {
        Value::Array(self.items.iter().map(|item| item.to_json()).collect())
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ============================================================================
// ItemConfig
// ============================================================================

/// Configuration of a single attribute item
///
/// Typed getters report malformed values as configuration errors naming
/// the entity, the collection key and the item id.
#[derive(Debug, Clone)]
pub struct ItemConfig {
    entity: String,
    key: String,
    id: String,
    values: Map<String, Value>,
}

impl ItemConfig {
    /// Create an item configuration
    pub fn new(
        entity: impl Into<String>,
        key: impl Into<String>,
        id: impl Into<String>,
        values: Map<String, Value>,
    ) -> Self {
        Self {
            entity: entity.into(),
            key: key.into(),
            id: id.into(),
            values,
        }
    }

    /// Item id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw value of a key
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|value| !value.is_null())
    }

    /// Optional string value
    pub fn string(&self, key: &str) -> EngineResult<Option<String>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(format!("'{}' must be a string", key))),
        }
    }

    /// Boolean value, `default` when absent
    pub fn flag(&self, key: &str, default: bool) -> EngineResult<bool> {
        match self.value(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.invalid(format!("'{}' must be a boolean", key))),
        }
    }

    /// Optional non-negative integer value
    pub fn integer(&self, key: &str) -> EngineResult<Option<u64>> {
        match self.value(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("'{}' must be a non-negative integer", key))),
        }
    }

    /// Optional table value
    pub fn table(&self, key: &str) -> EngineResult<Option<&Map<String, Value>>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(self.invalid(format!("'{}' must be a table", key))),
        }
    }

    /// Build a configuration error for this item
    pub fn invalid(&self, message: impl AsRef<str>) -> EngineError {
        EngineError::configuration(
            &self.entity,
            format!("{}.{}: {}", self.key, self.id, message.as_ref()),
        )
    }
}

// ============================================================================
// AttributeFactory
// ============================================================================

/// Constructor turning a prepared builder and the item configuration into
/// a concrete attribute
pub type Constructor<T> = fn(AttributeBuilder, &ItemConfig) -> EngineResult<T>;

/// Registration table from type discriminator to constructor
#[derive(Debug, Clone)]
pub struct AttributeFactory<T> {
    key: String,
    default_kind: String,
    constructors: HashMap<String, Constructor<T>>,
}

impl<T: SchemaAttribute> AttributeFactory<T> {
    /// Create a factory for a configuration key with a default discriminator
    pub fn new(key: impl Into<String>, default_kind: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default_kind: default_kind.into(),
            constructors: HashMap::new(),
        }
    }

    /// Register a constructor for a discriminator, replacing any previous one
    pub fn register(&mut self, kind: impl Into<String>, constructor: Constructor<T>) -> &mut Self {
        self.constructors.insert(kind.into(), constructor);
        self
    }

    /// Register a constructor using builder pattern
    pub fn with(mut self, kind: impl Into<String>, constructor: Constructor<T>) -> Self {
        self.register(kind, constructor);
        self
    }

    /// The configuration key this factory reads (`fields`, `columns`, ...)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Discriminator used when an item does not name one
    pub fn default_kind(&self) -> &str {
        &self.default_kind
    }

    /// Registered discriminators, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// An empty collection
    pub fn new_collection(&self) -> Collection<T> {
        Collection::new()
    }

    /// Build a collection from the raw items configured for an entity
    ///
    /// Items may be a table of `id = "type"` shorthands, a table of
    /// `id = { type = "...", ... }` definitions, or a list of ids.
    pub fn create_from_collection(
        &self,
        entity: &EntityScope,
        items: &Value,
    ) -> EngineResult<Collection<T>> {
        let mut collection = self.new_collection();

        for (id, config) in self.normalize(entity, items)? {
            let item = self.create(entity, &id, config)?;
            collection
                .try_push(item)
                .map_err(|item| EngineError::DuplicateAttribute {
                    entity: entity.entity_id().to_string(),
                    key: self.key.clone(),
                    id: item.id().to_string(),
                })?;
        }

        tracing::debug!(
            "Built {} {} for entity '{}'",
            collection.len(),
            self.key,
            entity.entity_id()
        );

        Ok(collection)
    }

    /// Build a single attribute from its configuration
    pub fn create(
        &self,
        entity: &EntityScope,
        id: &str,
        config: Map<String, Value>,
    ) -> EngineResult<T> {
        let item = ItemConfig::new(entity.entity_id(), &self.key, id, config);
        let kind = item
            .string("type")?
            .unwrap_or_else(|| self.default_kind.clone());

        let constructor =
            self.constructors
                .get(&kind)
                .ok_or_else(|| EngineError::UnknownAttributeType {
                    entity: entity.entity_id().to_string(),
                    key: self.key.clone(),
                    kind: kind.clone(),
                })?;

        let builder = AttributeBuilder::new(entity.clone(), id)
            .kind(kind)
            .hide(item.flag("hide", false)?);

        constructor(builder, &item)
    }

    fn normalize(
        &self,
        entity: &EntityScope,
        items: &Value,
    ) -> EngineResult<Vec<(String, Map<String, Value>)>> {
        let invalid = |message: String| {
            EngineError::configuration(entity.entity_id(), format!("{}: {}", self.key, message))
        };

        match items {
            Value::Object(map) => map
                .iter()
                .map(|(id, value)| match value {
                    Value::String(kind) => Ok((id.clone(), kind_only(kind))),
                    Value::Object(config) => Ok((id.clone(), config.clone())),
                    Value::Null | Value::Bool(true) => Ok((id.clone(), Map::new())),
                    _ => Err(invalid(format!(
                        "item '{}' must be a type name or a table",
                        id
                    ))),
                })
                .collect(),
            Value::Array(list) => list
                .iter()
                .map(|value| match value {
                    Value::String(id) => Ok((id.clone(), Map::new())),
                    Value::Object(config) => match config.get("id") {
                        Some(Value::String(id)) => Ok((id.clone(), config.clone())),
                        _ => Err(invalid("list items given as tables need an 'id'".into())),
                    },
                    _ => Err(invalid("list items must be ids or tables".into())),
                })
                .collect(),
            _ => Err(invalid("expected a table or a list of items".into())),
        }
    }
}

fn kind_only(kind: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".into(), Value::String(kind.to_string()));
    map
}

// ============================================================================
// Tests
// ============================================================================
