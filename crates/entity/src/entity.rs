//! Entity definition
//!
//! An [`Entity`] aggregates the field, column and related collections of
//! one manageable resource together with its listing settings. It is
//! created and configured by the [`EntityFactory`] and read-only
//! afterwards.

use crate::factory::EntityFactory;
use crate::form::FormProcessor;
use crate::permissions::Permissions;
use cruddy_core::{
    Action, Arrayable, EngineError, EngineResult, EntityId, SortDirection, Validatable,
    prettify_string, ucfirst,
};
use cruddy_schema::{Collection, Column, EntityScope, Field, Query, Related, SchemaAttribute};
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

/// Items per listing page when none is configured
pub const DEFAULT_PER_PAGE: u64 = 30;

// ============================================================================
// Entity
// ============================================================================

/// A configured, named aggregate of attribute collections
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    scope: EntityScope,
    permissions: Arc<dyn Permissions>,
    fields: Collection<Field>,
    columns: Collection<Column>,
    related: Collection<Related>,
    title: Option<String>,
    primary_column: Option<String>,
    order_by: Option<(String, SortDirection)>,
    per_page: u64,
    form: OnceLock<Arc<dyn FormProcessor>>,
}

impl Entity {
    /// Create an unconfigured entity
    pub fn new(
        id: impl Into<EntityId>,
        scope: EntityScope,
        permissions: Arc<dyn Permissions>,
    ) -> Self {
        Self {
            id: id.into(),
            scope,
            permissions,
            fields: Collection::new(),
            columns: Collection::new(),
            related: Collection::new(),
            title: None,
            primary_column: None,
            order_by: None,
            per_page: DEFAULT_PER_PAGE,
            form: OnceLock::new(),
        }
    }

    /// Build the collections and read the listing settings
    pub fn configure(&mut self, factory: &EntityFactory, config: &Value) -> EngineResult<()> {
        self.fields = factory.create_fields(self)?;
        self.columns = factory.create_columns(self)?;
        self.related = factory.create_related(self)?;

        self.title = self.string_setting(config, "title")?;
        self.primary_column = self.string_setting(config, "primary_column")?.or_else(|| {
            self.columns
                .first()
                .map(|column| column.id().to_string())
                .or_else(|| self.fields.first().map(|field| field.id().to_string()))
        });

        self.order_by = match self.string_setting(config, "order_by")? {
            Some(column) => {
                let direction = match self.string_setting(config, "order_direction")? {
                    Some(direction) => direction.parse::<SortDirection>().map_err(|_| {
                        EngineError::configuration(
                            &self.id,
                            format!("'{}' is not a sort direction", direction),
                        )
                    })?,
                    None => SortDirection::default(),
                };
                Some((column, direction))
            }
            None => None,
        };

        self.per_page = match config.get("per_page").filter(|value| !value.is_null()) {
            Some(value) => value.as_u64().ok_or_else(|| {
                EngineError::configuration(&self.id, "'per_page' must be a non-negative integer")
            })?,
            None => DEFAULT_PER_PAGE,
        };

        self.validate()
    }

    /// Entity id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The scope attributes use to reach this entity's translations
    pub fn scope(&self) -> &EntityScope {
        &self.scope
    }

    /// Form fields
    pub fn fields(&self) -> &Collection<Field> {
        &self.fields
    }

    /// Listing columns
    pub fn columns(&self) -> &Collection<Column> {
        &self.columns
    }

    /// Related lists
    pub fn related(&self) -> &Collection<Related> {
        &self.related
    }

    /// Column identifying an item to the user
    pub fn primary_column(&self) -> Option<&str> {
        self.primary_column.as_deref()
    }

    /// Default listing order
    pub fn order_by(&self) -> Option<(&str, SortDirection)> {
        self.order_by
            .as_ref()
            .map(|(column, direction)| (column.as_str(), *direction))
    }

    /// Items per listing page
    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Translate a key scoped to this entity
    pub fn translate(&self, key: &str, default: Option<&str>) -> Option<String> {
        self.scope.translate(key, default)
    }

    /// Display title: translation, then configuration, then the prettified id
    pub fn title(&self) -> String {
        self.translate("title", None)
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| ucfirst(&prettify_string(&self.id)))
    }

    /// Whether an action is permitted on this entity
    pub fn is_permitted(&self, action: Action) -> bool {
        self.permissions.is_permitted(action, &self.id)
    }

    /// The form processor, created on first use
    pub fn form(&self, factory: &EntityFactory) -> EngineResult<Arc<dyn FormProcessor>> {
        if let Some(form) = self.form.get() {
            return Ok(form.clone());
        }

        let form = factory.create_form(self)?;
        Ok(self.form.get_or_init(|| form).clone())
    }

    /// Prepare a listing query: let every column adjust it, then order it by
    /// the requested column or the default order
    pub fn prepare_listing(
        &self,
        query: &mut Query,
        order: Option<(&str, SortDirection)>,
    ) -> EngineResult<()> {
        for column in &self.columns {
            column.modify_query(query);
        }

        let Some((column_id, direction)) = order.or_else(|| self.order_by()) else {
            return Ok(());
        };

        let column = self.orderable_column(column_id)?;
        column.order(query, direction);
        Ok(())
    }

    fn orderable_column(&self, id: &str) -> EngineResult<&Column> {
        let column = self
            .columns
            .get(id)
            .ok_or_else(|| EngineError::AttributeNotFound {
                entity: self.id.clone(),
                id: id.to_string(),
            })?;

        if !column.can_order() {
            return Err(EngineError::InvalidOrder {
                entity: self.id.clone(),
                column: id.to_string(),
            });
        }
        Ok(column)
    }

    fn string_setting(&self, config: &Value, key: &str) -> EngineResult<Option<String>> {
        match config.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(EngineError::configuration(
                &self.id,
                format!("'{}' must be a string", key),
            )),
        }
    }
}

impl Validatable for Entity {
    fn validate(&self) -> EngineResult<()> {
        if self.fields.is_empty() {
            return Err(EngineError::configuration(&self.id, "no fields configured"));
        }

        if let Some(primary) = &self.primary_column
            && !self.columns.contains(primary)
            && !self.fields.contains(primary)
        {
            return Err(EngineError::configuration(
                &self.id,
                format!("primary column '{}' is neither a column nor a field", primary),
            ));
        }

        if let Some((column, _)) = self.order_by() {
            self.orderable_column(column)?;
        }

        if self.per_page == 0 {
            return Err(EngineError::configuration(
                &self.id,
                "'per_page' must be greater than zero",
            ));
        }

        Ok(())
    }
}

impl Arrayable for Entity {
    fn to_array(&self) -> Map<String, Value> {
        let mut permissions = Map::new();
        for action in Action::ALL {
            permissions.insert(
                action.as_str().to_string(),
                Value::Bool(self.is_permitted(action)),
            );
        }

        let mut map = Map::new();
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("title".into(), Value::String(self.title()));
        map.insert(
            "primary_column".into(),
            self.primary_column.clone().map_or(Value::Null, Value::String),
        );
        map.insert(
            "order_by".into(),
            self.order_by()
                .map_or(Value::Null, |(column, direction)| {
                    serde_json::json!({ "column": column, "direction": direction.to_string() })
                }),
        );
        map.insert("per_page".into(), Value::from(self.per_page));
        map.insert("permissions".into(), Value::Object(permissions));
        map.insert("fields".into(), self.fields.to_value());
        map.insert("columns".into(), self.columns.to_value());
        map.insert("related".into(), self.related.to_value());
        map
    }
}

// ============================================================================
// Tests
// ============================================================================
