//! # Cruddy Entity
//!
//! Entity registry of cruddy.
//!
//! ## Core Concepts
//!
//! - **EntityFactory**: lazily resolves entity ids to configured entities and caches them
//! - **Entity**: fields, columns and related lists of one resource plus its listing settings
//! - **ConfigRepository**: namespaced configuration trees, usually one file per entity
//! - **Container**: service locator for models and custom form processors
//! - **Form**: a model paired with the validator checking its input
//!

pub mod config;
pub mod container;
pub mod entity;
pub mod factory;
pub mod form;
pub mod permissions;
pub mod validation;

// Re-export commonly used types at crate root
pub use config::{ConfigRepository, ConfigSource, ENTITIES_NAMESPACE};
pub use container::Container;
pub use entity::{DEFAULT_PER_PAGE, Entity};
pub use factory::EntityFactory;
pub use form::{Form, FormDefinition, FormProcessor, Model};
pub use permissions::{PermissionTable, Permissions, PermitAll};
pub use validation::{
    Rule, RuleMap, RuleSpec, RuleValidatorFactory, StringMap, ValidationErrors, Validator,
    ValidatorFactory,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
