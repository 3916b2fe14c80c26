//! # Cruddy Schema
//!
//! Attribute schema of cruddy entities.
//!
//! ## Core Concepts
//!
//! - **Attribute**: identity and metadata shared by every field, column and related list
//! - **Field**: an attribute edited through the entity form
//! - **Column**: an attribute shown in (and ordering) the entity listing
//! - **Related**: a list of another entity's items shown next to the form
//! - **AttributeFactory**: registration table turning configuration items into attributes
//! - **EntityScope**: the link from an attribute back to its entity's translations
//!

pub mod attribute;
pub mod collection;
pub mod column;
pub mod field;
pub mod lang;
pub mod query;
pub mod related;

// Re-export commonly used types at crate root
pub use attribute::{Attribute, AttributeBuilder, SchemaAttribute};
pub use collection::{AttributeFactory, Collection, Constructor, ItemConfig};
pub use column::{Column, ColumnFactory, ColumnKind};
pub use field::{DateMode, Field, FieldFactory, FieldKind, InputType};
pub use lang::{Catalog, EntityScope, Translator};
pub use query::{Order, Query, Select};
pub use related::{Related, RelatedFactory};

// Re-export core types that are commonly used with the schema
pub use cruddy_core::{Arrayable, EngineError, EngineResult, SortDirection};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
