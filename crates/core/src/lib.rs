//! # Cruddy Core
//!
//! Core types, traits, and error handling for cruddy.
//!
//! This crate provides the foundational building blocks shared by the
//! schema and entity crates:
//!
//! - **Types**: Sort directions, permission actions, configuration value helpers
//! - **Text**: Label prettification used for generated attribute labels
//! - **Traits**: Common behaviors like `Validatable` and `Arrayable`
//! - **Errors**: Unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod text;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult};
pub use text::{prettify_string, ucfirst};
pub use traits::{Arrayable, Validatable};
pub use types::{Action, AttributeId, EntityId, SortDirection, is_empty_value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
