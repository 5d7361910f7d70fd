use crate::registry::ScopeRegistry;
use crate::types::{Scope, ScopeType};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Reads configuration values stored against a scope.
pub trait ConfigValueReader: Send + Sync {
    /// The value in effect at the given scope, inheriting store → website → default.
    fn get_value(&self, path: &str, scope_type: ScopeType, scope_id: u32) -> Option<String>;

    /// The value stored at exactly the given scope, without inheritance.
    fn get_exact_value(&self, path: &str, scope_type: ScopeType, scope_id: u32)
    -> Option<String>;

    /// Every scope that stores `value` under `path`.
    fn find_scopes(&self, path: &str, value: &str) -> Vec<(ScopeType, u32)>;

    fn get_scope_value(&self, path: &str, scope: &Scope) -> Option<String> {
        self.get_value(path, scope.scope_type(), scope.config_id())
    }
}

pub trait ConfigValueWriter: Send + Sync {
    fn save_value(&self, path: &str, value: &str, scope_type: ScopeType, scope_id: u32);

    /// Returns whether a value was removed.
    fn delete_value(&self, path: &str, scope_type: ScopeType, scope_id: u32) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ValueKey {
    path: String,
    scope_type: ScopeType,
    scope_id: u32,
}

impl ValueKey {
    fn new(path: &str, scope_type: ScopeType, scope_id: u32) -> Self {
        ValueKey {
            path: path.to_string(),
            scope_type,
            // The default scope has no id of its own
            scope_id: match scope_type {
                ScopeType::Default => 0,
                _ => scope_id,
            },
        }
    }
}

/// Process-local config value storage.
pub struct InMemoryConfigStore {
    registry: Arc<dyn ScopeRegistry>,
    values: RwLock<HashMap<ValueKey, String>>,
}

impl InMemoryConfigStore {
    pub fn new(registry: Arc<dyn ScopeRegistry>) -> Self {
        InMemoryConfigStore {
            registry,
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl ConfigValueReader for InMemoryConfigStore {
    fn get_value(&self, path: &str, scope_type: ScopeType, scope_id: u32) -> Option<String> {
        if let Some(value) = self.get_exact_value(path, scope_type, scope_id) {
            return Some(value);
        }

        match scope_type {
            ScopeType::Stores => {
                let website_id = self.registry.get_store_by_id(scope_id).ok()?.website_id;
                self.get_value(path, ScopeType::Websites, website_id)
            }
            ScopeType::Websites => self.get_exact_value(path, ScopeType::Default, 0),
            ScopeType::Default => None,
        }
    }

    fn get_exact_value(
        &self,
        path: &str,
        scope_type: ScopeType,
        scope_id: u32,
    ) -> Option<String> {
        self.values
            .read()
            .get(&ValueKey::new(path, scope_type, scope_id))
            .cloned()
    }

    fn find_scopes(&self, path: &str, value: &str) -> Vec<(ScopeType, u32)> {
        let mut scopes: Vec<(ScopeType, u32)> = self
            .values
            .read()
            .iter()
            .filter(|(key, stored)| key.path == path && stored.as_str() == value)
            .map(|(key, _)| (key.scope_type, key.scope_id))
            .collect();
        scopes.sort_by_key(|(scope_type, scope_id)| (scope_type.as_str(), *scope_id));
        scopes
    }
}

impl ConfigValueWriter for InMemoryConfigStore {
    fn save_value(&self, path: &str, value: &str, scope_type: ScopeType, scope_id: u32) {
        self.values
            .write()
            .insert(ValueKey::new(path, scope_type, scope_id), value.to_string());
    }

    fn delete_value(&self, path: &str, scope_type: ScopeType, scope_id: u32) -> bool {
        self.values
            .write()
            .remove(&ValueKey::new(path, scope_type, scope_id))
            .is_some()
    }
}
