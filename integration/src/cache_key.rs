use scope::{Scope, ScopeError, ScopeRegistry, ScopeType};
use std::sync::Arc;

pub const CACHE_KEY_NAMESPACE: &str = "klevu_integration";

/// Separates the website part of a key from the store suffix.
const STORE_SEGMENT: &str = "_store_";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheKeyError {
    /// Kept apart from `ScopeError::InvalidArgument`; both messages are relied upon.
    #[error(
        "Invalid Scope Type provided. Valid scope types are: website, websites, store, stores. Received: {0}"
    )]
    ScopeValidation(String),

    #[error(transparent)]
    Scope(#[from] ScopeError),
}

/// Derives account feature cache keys of the form
/// `{namespace}_website_{website_id}[_store_{store_id}]`.
#[derive(Clone)]
pub struct CacheKeyResolver {
    registry: Arc<dyn ScopeRegistry>,
    namespace: String,
}

impl CacheKeyResolver {
    pub fn new(registry: Arc<dyn ScopeRegistry>) -> Self {
        CacheKeyResolver {
            registry,
            namespace: CACHE_KEY_NAMESPACE.to_string(),
        }
    }

    pub fn derive_key(&self, scope_id: u32, scope_type: &str) -> Result<String, CacheKeyError> {
        match ScopeType::from_literal(scope_type) {
            Some(ScopeType::Websites) => {
                let website = self.registry.get_website_by_id(scope_id)?;
                Ok(format!("{}_website_{}", self.namespace, website.id))
            }
            Some(ScopeType::Stores) => {
                let store = self.registry.get_store_by_id(scope_id)?;
                let website = self.registry.get_website_by_id(store.website_id)?;
                Ok(format!(
                    "{}_website_{}{}{}",
                    self.namespace, website.id, STORE_SEGMENT, store.id
                ))
            }
            _ => Err(CacheKeyError::ScopeValidation(scope_type.to_string())),
        }
    }

    pub fn derive_key_for_scope(&self, scope: &Scope) -> Result<String, CacheKeyError> {
        self.derive_key(scope.config_id(), scope.scope_type().as_str())
    }
}

/// The website level key a store level key falls back to, cut at the first
/// `_store_`. Keys without a store segment have no fallback.
pub fn website_fallback_key(key: &str) -> Option<&str> {
    key.find(STORE_SEGMENT).map(|index| &key[..index])
}
