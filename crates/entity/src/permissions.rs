//! Permission checks for entity actions

use cruddy_core::Action;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Decides whether an action may be performed on an entity
pub trait Permissions: Send + Sync + fmt::Debug {
    /// Whether `action` is permitted on the entity
    fn is_permitted(&self, action: Action, entity_id: &str) -> bool;
}

/// Permits everything
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl Permissions for PermitAll {
    fn is_permitted(&self, _action: Action, _entity_id: &str) -> bool {
        true
    }
}

/// Explicit allow-list; anything not allowed is denied
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    allowed: HashMap<String, HashSet<Action>>,
}

impl PermissionTable {
    /// Create a table that denies everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow actions on an entity
    pub fn allow(mut self, entity_id: impl Into<String>, actions: &[Action]) -> Self {
        self.allowed
            .entry(entity_id.into())
            .or_default()
            .extend(actions.iter().copied());
        self
    }
}

impl Permissions for PermissionTable {
    fn is_permitted(&self, action: Action, entity_id: &str) -> bool {
        self.allowed
            .get(entity_id)
            .is_some_and(|actions| actions.contains(&action))
    }
}
