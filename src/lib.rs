//! # Cruddy
//!
//! Configuration-driven admin panel schema.
//!
//! Entities are declared in configuration (fields, columns, related lists,
//! forms and validation rules) and materialized on demand by the
//! [`EntityFactory`], which keeps every resolved [`Entity`] for its own
//! lifetime.
//!
//! ```rust,ignore
//! use cruddy::prelude::*;
//! use std::sync::Arc;
//!
//! let config = ConfigRepository::from_entities_dir("entities")?;
//! let factory = EntityFactory::new(Arc::new(config), Arc::new(Container::new()));
//! let users = factory.resolve("users")?;
//! println!("{}", users.to_json());
//! ```

pub use cruddy_core as core;
pub use cruddy_entity as entity;
pub use cruddy_schema as schema;

pub use cruddy_core::{EngineError, EngineResult};
pub use cruddy_entity::{Entity, EntityFactory};

/// Commonly used types
pub mod prelude {
    pub use cruddy_core::{
        Action, Arrayable, EngineError, EngineResult, SortDirection, Validatable,
    };
    pub use cruddy_entity::{
        ConfigRepository, ConfigSource, Container, Entity, EntityFactory, Form, FormProcessor,
        Model, PermissionTable, Permissions, PermitAll, RuleValidatorFactory, Validator,
        ValidatorFactory,
    };
    pub use cruddy_schema::{
        Catalog, Column, ColumnFactory, EntityScope, Field, FieldFactory, Query, Related,
        RelatedFactory, SchemaAttribute, Translator,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
