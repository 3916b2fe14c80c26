//! Service locator
//!
//! Entity configuration names models and custom form processors by string
//! identifiers; the [`Container`] resolves those identifiers to shared
//! instances.

use crate::form::{FormProcessor, Model};
use cruddy_core::{EngineError, EngineResult};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of models and custom form processors
#[derive(Debug, Default)]
pub struct Container {
    models: RwLock<HashMap<String, Arc<Model>>>,
    forms: RwLock<HashMap<String, Arc<dyn FormProcessor>>>,
    autoload_models: bool,
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive unbound models from their class name instead of failing
    pub fn with_model_autoload(mut self) -> Self {
        self.autoload_models = true;
        self
    }

    /// Bind a model under an identifier
    pub fn bind_model(&self, id: impl Into<String>, model: Model) -> Arc<Model> {
        let model = Arc::new(model);
        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), model.clone());
        model
    }

    /// Bind a custom form processor under an identifier
    pub fn bind_form(&self, id: impl Into<String>, form: Arc<dyn FormProcessor>) {
        self.forms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), form);
    }

    /// Resolve a model
    pub fn make_model(&self, id: &str) -> EngineResult<Arc<Model>> {
        if let Some(model) = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
        {
            return Ok(model.clone());
        }

        if self.autoload_models {
            tracing::debug!("Autoloading model '{}'", id);
            let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
            let model = models
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Model::from_class(id)));
            return Ok(model.clone());
        }

        Err(EngineError::BindingNotFound(id.to_string()))
    }

    /// Resolve a custom form processor; the bound instance itself is returned
    pub fn make_form(&self, id: &str) -> EngineResult<Arc<dyn FormProcessor>> {
        self.forms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::BindingNotFound(id.to_string()))
    }

    /// Whether anything is bound under an identifier
    pub fn has(&self, id: &str) -> bool {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
            || self
                .forms
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(id)
    }
}
