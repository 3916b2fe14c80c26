//! Entity registry
//!
//! The [`EntityFactory`] lazily resolves entity ids to configured
//! [`Entity`] instances and memoizes them for its own lifetime. It also
//! builds the pieces an entity delegates to it: attribute collections and
//! form processors.

use crate::config::{ConfigSource, ENTITIES_NAMESPACE};
use crate::container::Container;
use crate::entity::Entity;
use crate::form::{Form, FormDefinition, FormProcessor};
use crate::permissions::{PermitAll, Permissions};
use crate::validation::{RuleValidatorFactory, ValidatorFactory};
use cruddy_core::{EngineError, EngineResult, SortDirection, is_empty_value};
use cruddy_schema::{
    AttributeFactory, Catalog, Collection, Column, ColumnFactory, EntityScope, Field, FieldFactory,
    Query, Related, RelatedFactory, SchemaAttribute, Translator,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-wide registry of configured entities
#[derive(Debug)]
pub struct EntityFactory {
    config: Arc<dyn ConfigSource>,
    container: Arc<Container>,
    translator: Arc<dyn Translator>,
    permissions: Arc<dyn Permissions>,
    validators: Arc<dyn ValidatorFactory>,
    fields: FieldFactory,
    columns: ColumnFactory,
    related: RelatedFactory,
    entities: RwLock<HashMap<String, Arc<Entity>>>,
}

impl EntityFactory {
    /// Create a registry over a configuration source and a service locator
    ///
    /// Translations default to none, permissions to [`PermitAll`] and
    /// validators to the [`RuleValidatorFactory`].
    pub fn new(config: Arc<dyn ConfigSource>, container: Arc<Container>) -> Self {
        Self {
            config,
            container,
            translator: Arc::new(Catalog::new()),
            permissions: Arc::new(PermitAll),
            validators: Arc::new(RuleValidatorFactory),
            fields: FieldFactory::fields(),
            columns: ColumnFactory::columns(),
            related: RelatedFactory::related(),
            entities: RwLock::new(HashMap::new()),
        }
    }

    /// Use a translator
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Use a permissions service
    pub fn with_permissions(mut self, permissions: Arc<dyn Permissions>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Use a validator factory
    pub fn with_validators(mut self, validators: Arc<dyn ValidatorFactory>) -> Self {
        self.validators = validators;
        self
    }

    /// Use a custom field factory
    pub fn with_field_factory(mut self, fields: FieldFactory) -> Self {
        self.fields = fields;
        self
    }

    /// Use a custom column factory
    pub fn with_column_factory(mut self, columns: ColumnFactory) -> Self {
        self.columns = columns;
        self
    }

    /// Use a custom related factory
    pub fn with_related_factory(mut self, related: RelatedFactory) -> Self {
        self.related = related;
        self
    }

    /// The service locator
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// The translator
    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve an entity, building and caching it on first use
    ///
    /// Every later call for the same id returns the same instance.
    pub fn resolve(&self, id: &str) -> EngineResult<Arc<Entity>> {
        if let Some(entity) = self.read_entities().get(id) {
            tracing::debug!("Entity '{}' resolved from cache", id);
            return Ok(entity.clone());
        }

        let config = self
            .config(id)
            .filter(|config| !is_empty_value(config))
            .ok_or_else(|| EngineError::EntityNotFound(id.to_string()))?;

        tracing::debug!("Building entity '{}'", id);
        let scope = EntityScope::new(id, self.translator.clone());
        let mut entity = Entity::new(id, scope, self.permissions.clone());
        entity.configure(self, &config)?;

        let entity = self
            .write_entities()
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(entity))
            .clone();
        Ok(entity)
    }

    /// Ids of every configured entity, in definition order
    pub fn ids(&self) -> Vec<String> {
        self.config.keys(ENTITIES_NAMESPACE)
    }

    /// Resolve every configured entity
    pub fn resolve_all(&self) -> EngineResult<Vec<Arc<Entity>>> {
        self.ids().iter().map(|id| self.resolve(id)).collect()
    }

    /// Ids of the entities resolved so far, sorted
    pub fn resolved(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read_entities().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Forget every resolved entity
    pub fn flush(&self) {
        self.write_entities().clear();
    }

    // ========================================================================
    // Forms
    // ========================================================================

    /// Build the form processor of an entity
    ///
    /// A string `form` names a custom processor bound in the container; a
    /// table is read as a [`FormDefinition`].
    pub fn create_form(&self, entity: &Entity) -> EngineResult<Arc<dyn FormProcessor>> {
        match self.config(&format!("{}.form", entity.id())) {
            None | Some(Value::Null) => Err(EngineError::configuration(
                entity.id(),
                "form definition is missing",
            )),
            Some(Value::String(id)) => self.container.make_form(&id),
            Some(value @ Value::Object(_)) => {
                let definition: FormDefinition = serde_json::from_value(value).map_err(|e| {
                    EngineError::configuration(entity.id(), format!("invalid form: {}", e))
                })?;

                let model = self.container.make_model(&definition.model)?;
                let validator = self.validators.make(
                    Map::new(),
                    &definition.rules,
                    &definition.messages,
                    &definition.custom_attributes,
                )?;

                Ok(Arc::new(Form::new(model, validator)))
            }
            Some(other) => Err(EngineError::configuration(
                entity.id(),
                format!("form must be a string or a table, got {}", other),
            )),
        }
    }

    /// Build a listing query for an entity
    ///
    /// The model key is always selected so rows can be linked back to
    /// their forms.
    pub fn listing_query(
        &self,
        entity: &Entity,
        order: Option<(&str, SortDirection)>,
    ) -> EngineResult<Query> {
        let form = entity.form(self)?;
        let model = form.model();
        let mut query = Query::table(model.table());
        query.select(model.key_name());
        entity.prepare_listing(&mut query, order)?;
        Ok(query)
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Build the fields of an entity; at least one is required
    pub fn create_fields(&self, entity: &Entity) -> EngineResult<Collection<Field>> {
        self.create_collection(entity, "fields", &self.fields, true)
    }

    /// Build the columns of an entity
    pub fn create_columns(&self, entity: &Entity) -> EngineResult<Collection<Column>> {
        self.create_collection(entity, "columns", &self.columns, false)
    }

    /// Build the related lists of an entity
    pub fn create_related(&self, entity: &Entity) -> EngineResult<Collection<Related>> {
        self.create_collection(entity, "related", &self.related, false)
    }

    /// Build the collection configured under `{entity}.{key}`
    pub fn create_collection<T: SchemaAttribute>(
        &self,
        entity: &Entity,
        key: &str,
        factory: &AttributeFactory<T>,
        required: bool,
    ) -> EngineResult<Collection<T>> {
        let items = self
            .config(&format!("{}.{}", entity.id(), key))
            .filter(|items| !is_empty_value(items));

        match items {
            Some(items) => factory.create_from_collection(entity.scope(), &items),
            None if required => Err(EngineError::configuration(
                entity.id(),
                format!("'{}' must not be empty", key),
            )),
            None => Ok(factory.new_collection()),
        }
    }

    /// Read entity configuration by dotted key
    pub fn config(&self, key: &str) -> Option<Value> {
        self.config.get(&format!("{}::{}", ENTITIES_NAMESPACE, key))
    }

    fn read_entities(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Entity>>> {
        self.entities.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entities(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Entity>>> {
        self.entities.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigRepository;
    use crate::form::Model;
    use crate::validation::{Rule, Validator};
    use cruddy_core::Arrayable;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entities() -> Value {
        json!({
            "users": {
                "fields": {
                    "name": "string",
                    "email": { "type": "email", "required": true },
                },
                "columns": ["name", "email"],
                "form": {
                    "model": "App\\User",
                    "rules": { "name": "required" },
                    "customAttributes": { "name": "full name" },
                },
            },
            "posts": {
                "fields": ["title"],
                "related": { "comments": { "relation": "comments" } },
                "form": "forms.posts",
            },
            "tags": { "columns": ["name"] },
            "empty": {},
            "broken": { "fields": { "name": "colour" } },
        })
    }

    fn factory() -> EntityFactory {
        let container = Container::new();
        container.bind_model("App\\User", Model::new("App\\User", "users"));
        EntityFactory::new(
            Arc::new(ConfigRepository::new().with_namespace(ENTITIES_NAMESPACE, entities())),
            Arc::new(container),
        )
    }

    #[test]
    fn test_resolve_returns_cached_instance() {
        let factory = factory();
        let first = factory.resolve("users").unwrap();
        let second = factory.resolve("users").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.resolved(), vec!["users".to_string()]);
    }

    #[test]
    fn test_resolve_missing_or_empty_configuration() {
        let factory = factory();

        let err = factory.resolve("missing").unwrap_err();
        assert!(matches!(err, EngineError::EntityNotFound(ref id) if id == "missing"));
        assert!(err.to_string().contains("missing"));

        let err = factory.resolve("empty").unwrap_err();
        assert!(matches!(err, EngineError::EntityNotFound(_)));
        assert!(factory.resolved().is_empty());
    }

    #[test]
    fn test_fields_are_required() {
        let err = factory().resolve("tags").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("fields"));
    }

    #[test]
    fn test_empty_fields_mapping_is_rejected() {
        let factory = EntityFactory::new(
            Arc::new(ConfigRepository::new().with_namespace(
                ENTITIES_NAMESPACE,
                json!({ "tags": { "title": "Tags", "fields": {} } }),
            )),
            Arc::new(Container::new()),
        );
        assert!(factory.resolve("tags").unwrap_err().is_configuration());
    }

    #[test]
    fn test_optional_collections_default_to_empty() {
        let factory = factory();
        let posts = factory.resolve("posts").unwrap();

        assert!(posts.columns().is_empty());
        assert_eq!(posts.related().ids(), vec!["comments"]);

        let users = factory.resolve("users").unwrap();
        assert!(users.related().is_empty());
    }

    #[test]
    fn test_unknown_attribute_type() {
        let err = factory().resolve("broken").unwrap_err();
        assert!(matches!(err, EngineError::UnknownAttributeType { ref kind, .. } if kind == "colour"));
    }

    #[test]
    fn test_string_form_is_resolved_through_container() {
        let factory = factory();
        let custom: Arc<dyn FormProcessor> = Arc::new(Form::new(
            Arc::new(Model::new("App\\Post", "articles")),
            Validator::default(),
        ));
        factory.container().bind_form("forms.posts", custom.clone());

        let posts = factory.resolve("posts").unwrap();
        let form = factory.create_form(&posts).unwrap();
        assert!(Arc::ptr_eq(&form, &custom));
    }

    #[test]
    fn test_table_form_builds_model_and_validator() {
        let factory = factory();
        let users = factory.resolve("users").unwrap();
        let form = factory.create_form(&users).unwrap();

        assert_eq!(form.model().class(), "App\\User");
        assert_eq!(form.model().table(), "users");
        assert_eq!(form.validator().rules_for("name"), [Rule::Required]);
        assert_eq!(form.validator().custom_attributes()["name"], "full name");

        let errors = form.validate(&Map::new()).unwrap_err();
        assert_eq!(errors.first("name"), Some("The full name field is required."));
    }

    #[test]
    fn test_entity_form_is_cached() {
        let factory = factory();
        let users = factory.resolve("users").unwrap();

        let first = users.form(&factory).unwrap();
        let second = users.form(&factory).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_form_is_a_configuration_error() {
        let factory = EntityFactory::new(
            Arc::new(ConfigRepository::new().with_namespace(
                ENTITIES_NAMESPACE,
                json!({ "tags": { "fields": ["name"] } }),
            )),
            Arc::new(Container::new()),
        );
        let tags = factory.resolve("tags").unwrap();

        assert!(factory.create_form(&tags).unwrap_err().is_configuration());
    }

    #[test]
    fn test_unbound_custom_form() {
        let factory = factory();
        let posts = factory.resolve("posts").unwrap();
        let err = factory.create_form(&posts).unwrap_err();
        assert!(matches!(err, EngineError::BindingNotFound(ref id) if id == "forms.posts"));
    }

    #[test]
    fn test_translations_are_scoped_per_entity() {
        let translator = Arc::new(
            Catalog::new()
                .with_line("users.fields.name", "Full name")
                .with_line("posts.fields.title", "Headline"),
        );
        let factory = factory().with_translator(translator);

        let users = factory.resolve("users").unwrap();
        assert_eq!(users.fields().get("name").unwrap().label(), "Full name");

        let posts = factory.resolve("posts").unwrap();
        assert_eq!(posts.fields().get("title").unwrap().label(), "Headline");
    }

    #[test]
    fn test_listing_query() {
        let factory = factory();
        let users = factory.resolve("users").unwrap();
        let query = factory
            .listing_query(&users, Some(("email", SortDirection::Desc)))
            .unwrap();

        assert_eq!(
            query.to_sql(),
            "SELECT id, name, email FROM users ORDER BY email DESC"
        );
    }

    #[test]
    fn test_listing_query_selects_model_key() {
        let container = Container::new();
        container.bind_model(
            "App\\Post",
            Model::new("App\\Post", "articles").with_key_name("uuid"),
        );
        let factory = EntityFactory::new(
            Arc::new(ConfigRepository::new().with_namespace(
                ENTITIES_NAMESPACE,
                json!({
                    "posts": {
                        "fields": ["title"],
                        "columns": { "title": "proto", "author.name": "proto", "uuid": "proto" },
                        "form": { "model": "App\\Post" },
                    }
                }),
            )),
            Arc::new(container),
        );
        let posts = factory.resolve("posts").unwrap();

        let query = factory.listing_query(&posts, None).unwrap();
        assert_eq!(query.to_sql(), "SELECT uuid, title FROM articles");
        assert_eq!(query.eager_loads(), ["author".to_string()]);

        let err = factory
            .listing_query(&posts, Some(("author.name", SortDirection::Asc)))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidOrder { .. }));
    }

    #[test]
    fn test_flush_and_resolve_all() {
        let factory = EntityFactory::new(
            Arc::new(ConfigRepository::new().with_namespace(
                ENTITIES_NAMESPACE,
                json!({ "users": { "fields": ["name"] }, "posts": { "fields": ["title"] } }),
            )),
            Arc::new(Container::new()),
        );

        let all = factory.resolve_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(factory.resolved(), vec!["posts".to_string(), "users".to_string()]);

        let before = factory.resolve("users").unwrap();
        factory.flush();
        assert!(factory.resolved().is_empty());
        let after = factory.resolve("users").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.to_array(), after.to_array());
    }

    #[test]
    fn test_concurrent_resolution_shares_one_instance() {
        let factory = Arc::new(factory());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let factory = factory.clone();
                std::thread::spawn(move || factory.resolve("users").unwrap())
            })
            .collect();

        let entities: Vec<Arc<Entity>> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        assert!(entities.iter().all(|entity| Arc::ptr_eq(entity, &entities[0])));
    }
}
