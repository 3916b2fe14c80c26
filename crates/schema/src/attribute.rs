//! Attribute base type
//!
//! Every field, column and related list shares the same identity and
//! metadata: an id, the owning entity, a display class for the UI, a type
//! tag, a visibility flag and whether it can order data. Those live in
//! [`Attribute`], which is assembled once through [`AttributeBuilder`] and
//! is immutable afterwards.

use crate::lang::EntityScope;
use crate::query::Query;
use cruddy_core::{Arrayable, AttributeId, SortDirection, prettify_string, ucfirst};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// SchemaAttribute Trait
// ============================================================================

/// Behavior shared by every attribute variant
///
/// Variants embed an [`Attribute`] and override the query hooks when they
/// need something other than the defaults.
pub trait SchemaAttribute: Arrayable + fmt::Debug + Send + Sync {
    /// The common attribute data
    fn attribute(&self) -> &Attribute;

    /// Attribute id
    fn id(&self) -> &str {
        self.attribute().id()
    }

    /// Whether the attribute can order data
    fn can_order(&self) -> bool {
        self.attribute().can_order()
    }

    /// Whether the attribute is hidden
    fn is_hidden(&self) -> bool {
        self.attribute().is_hidden()
    }

    /// Adjust a listing query this attribute takes part in
    fn modify_query(&self, _query: &mut Query) {}

    /// Append the order clause for this attribute
    fn order(&self, query: &mut Query, direction: SortDirection) {
        query.order_by(self.id(), direction);
    }
}

// ============================================================================
// Attribute
// ============================================================================

/// Identity and metadata common to all attributes
#[derive(Debug, Clone)]
pub struct Attribute {
    id: AttributeId,
    entity: EntityScope,
    class: String,
    kind: String,
    hide: bool,
    can_order: bool,
}

impl Attribute {
    /// Start building an attribute
    pub fn builder(entity: EntityScope, id: impl Into<AttributeId>) -> AttributeBuilder {
        AttributeBuilder::new(entity, id)
    }

    /// Attribute id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The owning entity
    pub fn entity(&self) -> &EntityScope {
        &self.entity
    }

    /// UI class used to render the attribute
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Type tag
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether the attribute is hidden
    pub fn is_hidden(&self) -> bool {
        self.hide
    }

    /// Whether the attribute can order data
    pub fn can_order(&self) -> bool {
        self.can_order
    }

    /// Localized help line, if one exists
    pub fn help(&self) -> Option<String> {
        self.translate(Some("help"), None)
    }

    /// Translate the attribute id, optionally under a group (`{group}.{id}`)
    pub fn translate(&self, group: Option<&str>, default: Option<&str>) -> Option<String> {
        let key = match group {
            Some(group) => format!("{}.{}", group, self.id),
            None => self.id.clone(),
        };

        self.entity.translate(&key, default)
    }

    /// Label derived from the id: `first_name` becomes `First name`
    pub fn generate_label(&self) -> String {
        ucfirst(&prettify_string(&self.id))
    }
}

impl Arrayable for Attribute {
    fn to_array(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("class".into(), Value::String(self.class.clone()));
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("type".into(), Value::String(self.kind.clone()));
        map.insert("hide".into(), Value::Bool(self.hide));
        map.insert("help".into(), self.help().map_or(Value::Null, Value::String));
        map.insert("can_order".into(), Value::Bool(self.can_order));
        map
    }
}

// ============================================================================
// AttributeBuilder
// ============================================================================

/// Configuration phase of an [`Attribute`]
#[derive(Debug, Clone)]
pub struct AttributeBuilder {
    id: AttributeId,
    entity: EntityScope,
    class: String,
    kind: String,
    hide: bool,
    can_order: bool,
}

impl AttributeBuilder {
    /// Create a builder for an attribute of an entity
    pub fn new(entity: EntityScope, id: impl Into<AttributeId>) -> Self {
        Self {
            id: id.into(),
            entity,
            class: String::new(),
            kind: String::new(),
            hide: false,
            can_order: false,
        }
    }

    /// Attribute id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The owning entity
    pub fn entity(&self) -> &EntityScope {
        &self.entity
    }

    /// Set the UI class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Set the type tag
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the hide flag
    pub fn hide(mut self, value: bool) -> Self {
        self.hide = value;
        self
    }

    /// Set whether the attribute can order data
    pub fn can_order(mut self, value: bool) -> Self {
        self.can_order = value;
        self
    }

    /// Finish configuration
    pub fn build(self) -> Attribute {
        Attribute {
            id: self.id,
            entity: self.entity,
            class: self.class,
            kind: self.kind,
            hide: self.hide,
            can_order: self.can_order,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{Catalog, Translator};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Plain(Attribute);

    impl Arrayable for Plain {
        fn to_array(&self) -> Map<String, Value> {
            self.0.to_array()
        }
    }

    impl SchemaAttribute for Plain {
        fn attribute(&self) -> &Attribute {
            &self.0
        }
    }

    fn email() -> Attribute {
        Attribute::builder(EntityScope::untranslated("users"), "email")
            .class("Input")
            .kind("text")
            .build()
    }

    #[test]
    fn test_to_array_shape() {
        assert_eq!(
            email().to_json(),
            json!({
                "class": "Input",
                "id": "email",
                "type": "text",
                "hide": false,
                "help": null,
                "can_order": false,
            })
        );
    }

    #[test]
    fn test_to_array_key_order() {
        let keys: Vec<_> = email().to_array().keys().cloned().collect();
        assert_eq!(keys, vec!["class", "id", "type", "hide", "help", "can_order"]);
    }

    #[test]
    fn test_help_is_translated_per_entity() {
        let catalog: Arc<dyn Translator> = Arc::new(
            Catalog::new().with_line("users.help.email", "We never share it"),
        );
        let attribute = Attribute::builder(EntityScope::new("users", catalog), "email").build();

        assert_eq!(attribute.help().as_deref(), Some("We never share it"));
        assert_eq!(attribute.to_array()["help"], json!("We never share it"));
    }

    #[test]
    fn test_translate_without_group() {
        let catalog: Arc<dyn Translator> =
            Arc::new(Catalog::new().with_line("users.email", "Mail"));
        let attribute = Attribute::builder(EntityScope::new("users", catalog), "email").build();

        assert_eq!(attribute.translate(None, None).as_deref(), Some("Mail"));
        assert_eq!(
            attribute.translate(Some("fields"), Some("E-mail")).as_deref(),
            Some("E-mail")
        );
    }

    #[test]
    fn test_generate_label() {
        let attribute = Attribute::builder(EntityScope::untranslated("users"), "first_name").build();
        assert_eq!(attribute.generate_label(), "First name");
    }

    #[test]
    fn test_builder_flags() {
        let attribute = Attribute::builder(EntityScope::untranslated("users"), "email")
            .hide(true)
            .can_order(true)
            .build();
        assert!(attribute.is_hidden());
        assert!(attribute.can_order());
        assert_eq!(attribute.entity().entity_id(), "users");
    }

    #[test]
    fn test_default_query_hooks() {
        let plain = Plain(email());
        let mut query = Query::table("users");

        plain.modify_query(&mut query);
        assert_eq!(query, Query::table("users"));

        plain.order(&mut query, SortDirection::Desc);
        assert_eq!(query.to_sql(), "SELECT * FROM users ORDER BY email DESC");
    }
}
