use crate::config::{RegistryConfig, ValidationError};
use crate::error::ScopeError;
use crate::types::{Store, StoreId, Website, WebsiteId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Read access to the platform's websites and stores.
///
/// `current_store` and `current_website` are the ambient values for the
/// executing request (e.g. the store a storefront visitor is browsing).
pub trait ScopeRegistry: Send + Sync {
    fn get_store_by_id(&self, id: StoreId) -> Result<Arc<Store>, ScopeError>;
    fn get_store_by_code(&self, code: &str) -> Result<Arc<Store>, ScopeError>;
    fn get_website_by_id(&self, id: WebsiteId) -> Result<Arc<Website>, ScopeError>;
    fn get_website_by_code(&self, code: &str) -> Result<Arc<Website>, ScopeError>;
    fn is_single_store_mode(&self) -> bool;
    fn default_store_view(&self) -> Result<Arc<Store>, ScopeError>;
    fn current_store(&self) -> Option<Arc<Store>>;
    fn current_website(&self) -> Option<Arc<Website>>;
    /// All stores ordered by id
    fn stores(&self) -> Vec<Arc<Store>>;
    /// All websites ordered by id
    fn websites(&self) -> Vec<Arc<Website>>;
}

/// Request parameters of the executing request.
pub trait RequestParams: Send + Sync {
    fn get_param(&self, name: &str) -> Option<&str>;

    /// Reads the first non-empty parameter out of `names` as an entity id.
    /// `0` and non-numeric values do not identify an entity. They still count
    /// as the first match, so `store=0&store_id=5` resolves to nothing.
    fn get_id_param(&self, names: &[&str]) -> Option<u32> {
        let value = names
            .iter()
            .filter_map(|name| self.get_param(name))
            .map(str::trim)
            .find(|value| !value.is_empty())?;

        match value.parse::<u32>() {
            Ok(0) => None,
            Ok(id) => Some(id),
            Err(_) => {
                tracing::debug!(value, "Ignoring non-numeric scope id parameter");
                None
            }
        }
    }
}

impl RequestParams for HashMap<String, String> {
    fn get_param(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

struct RegistryData {
    single_store_mode: bool,
    default_website_id: Option<WebsiteId>,
    stores: BTreeMap<StoreId, Arc<Store>>,
    websites: BTreeMap<WebsiteId, Arc<Website>>,
}

/// Registry backed by a static set of websites and stores.
///
/// Clones share the underlying data; the ambient store/website is per clone so
/// each request can carry its own.
#[derive(Clone)]
pub struct InMemoryScopeRegistry {
    inner: Arc<RegistryData>,
    current_store: Option<Arc<Store>>,
    current_website: Option<Arc<Website>>,
}

impl InMemoryScopeRegistry {
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ValidationError> {
        config.validate()?;

        let website_ids: HashMap<&str, WebsiteId> = config
            .websites
            .iter()
            .map(|w| (w.code.as_str(), w.id))
            .collect();
        let store_ids: HashMap<&str, StoreId> = config
            .stores
            .iter()
            .map(|s| (s.code.as_str(), s.id))
            .collect();

        let websites = config
            .websites
            .iter()
            .map(|w| {
                let website = Website {
                    id: w.id,
                    code: w.code.clone(),
                    name: w.name.clone().unwrap_or_else(|| w.code.clone()),
                    default_store_id: w
                        .default_store
                        .as_deref()
                        .and_then(|code| store_ids.get(code).copied()),
                };
                (w.id, Arc::new(website))
            })
            .collect();

        let stores = config
            .stores
            .iter()
            .filter_map(|s| {
                let website_id = *website_ids.get(s.website.as_str())?;
                let store = Store {
                    id: s.id,
                    code: s.code.clone(),
                    name: s.name.clone().unwrap_or_else(|| s.code.clone()),
                    website_id,
                };
                Some((s.id, Arc::new(store)))
            })
            .collect();

        let default_website_id = config
            .default_website
            .as_deref()
            .and_then(|code| website_ids.get(code).copied());

        Ok(InMemoryScopeRegistry {
            inner: Arc::new(RegistryData {
                single_store_mode: config.single_store_mode,
                default_website_id,
                stores,
                websites,
            }),
            current_store: None,
            current_website: None,
        })
    }

    /// Returns a handle whose ambient store is the store with `code`.
    pub fn with_current_store(&self, code: &str) -> Result<Self, ScopeError> {
        let store = self.get_store_by_code(code)?;
        Ok(InMemoryScopeRegistry {
            inner: self.inner.clone(),
            current_store: Some(store),
            current_website: self.current_website.clone(),
        })
    }

    /// Returns a handle whose ambient website is the website with `code`.
    pub fn with_current_website(&self, code: &str) -> Result<Self, ScopeError> {
        let website = self.get_website_by_code(code)?;
        Ok(InMemoryScopeRegistry {
            inner: self.inner.clone(),
            current_store: self.current_store.clone(),
            current_website: Some(website),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.inner.stores.is_empty()
    }

    fn default_website(&self) -> Option<&Arc<Website>> {
        match self.inner.default_website_id {
            Some(id) => self.inner.websites.get(&id),
            None => self.inner.websites.values().next(),
        }
    }
}

impl ScopeRegistry for InMemoryScopeRegistry {
    fn get_store_by_id(&self, id: StoreId) -> Result<Arc<Store>, ScopeError> {
        self.inner
            .stores
            .get(&id)
            .cloned()
            .ok_or_else(|| ScopeError::store_not_found(id))
    }

    fn get_store_by_code(&self, code: &str) -> Result<Arc<Store>, ScopeError> {
        self.inner
            .stores
            .values()
            .find(|store| store.code == code)
            .cloned()
            .ok_or_else(|| ScopeError::store_not_found(code))
    }

    fn get_website_by_id(&self, id: WebsiteId) -> Result<Arc<Website>, ScopeError> {
        self.inner
            .websites
            .get(&id)
            .cloned()
            .ok_or_else(|| ScopeError::website_not_found(id))
    }

    fn get_website_by_code(&self, code: &str) -> Result<Arc<Website>, ScopeError> {
        self.inner
            .websites
            .values()
            .find(|website| website.code == code)
            .cloned()
            .ok_or_else(|| ScopeError::website_not_found(code))
    }

    fn is_single_store_mode(&self) -> bool {
        self.inner.single_store_mode && self.inner.stores.len() == 1
    }

    fn default_store_view(&self) -> Result<Arc<Store>, ScopeError> {
        let website = self
            .default_website()
            .ok_or_else(|| ScopeError::store_not_found("default"))?;

        website
            .default_store_id
            .and_then(|id| self.inner.stores.get(&id))
            .or_else(|| {
                self.inner
                    .stores
                    .values()
                    .find(|store| store.website_id == website.id)
            })
            .cloned()
            .ok_or_else(|| ScopeError::store_not_found("default"))
    }

    fn current_store(&self) -> Option<Arc<Store>> {
        self.current_store.clone()
    }

    fn current_website(&self) -> Option<Arc<Website>> {
        self.current_website.clone().or_else(|| {
            self.current_store
                .as_ref()
                .and_then(|store| self.inner.websites.get(&store.website_id))
                .cloned()
        })
    }

    fn stores(&self) -> Vec<Arc<Store>> {
        self.inner.stores.values().cloned().collect()
    }

    fn websites(&self) -> Vec<Arc<Website>> {
        self.inner.websites.values().cloned().collect()
    }
}
