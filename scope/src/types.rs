use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub type StoreId = u32;
pub type WebsiteId = u32;

/// A store view as known to the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Store {
    pub id: StoreId,
    pub code: String,
    pub name: String,
    pub website_id: WebsiteId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Website {
    pub id: WebsiteId,
    pub code: String,
    pub name: String,
    pub default_store_id: Option<StoreId>,
}

/// Configuration scope type.
///
/// The plural form is what gets persisted next to config values. Both singular
/// and plural literals are accepted when parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    Default,
    #[serde(alias = "website")]
    Websites,
    #[serde(alias = "store")]
    Stores,
}

impl ScopeType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScopeType::Default => "default",
            ScopeType::Websites => "websites",
            ScopeType::Stores => "stores",
        }
    }

    /// Parses `default`, `website`, `websites`, `store` or `stores`.
    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal {
            "default" => Some(ScopeType::Default),
            "website" | "websites" => Some(ScopeType::Websites),
            "store" | "stores" => Some(ScopeType::Stores),
            _ => None,
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The configuration context a value or cache entry is resolved against.
///
/// Only `Website` and `Store` carry an id, and they hold a shared handle to
/// the registry entry rather than owning a copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Default,
    Website(Arc<Website>),
    Store(Arc<Store>),
}

impl Scope {
    pub fn scope_type(&self) -> ScopeType {
        match self {
            Scope::Default => ScopeType::Default,
            Scope::Website(_) => ScopeType::Websites,
            Scope::Store(_) => ScopeType::Stores,
        }
    }

    pub fn id(&self) -> Option<u32> {
        match self {
            Scope::Default => None,
            Scope::Website(website) => Some(website.id),
            Scope::Store(store) => Some(store.id),
        }
    }

    /// Id used when reading or writing config values; the default scope is 0.
    pub fn config_id(&self) -> u32 {
        self.id().unwrap_or(0)
    }

    pub fn store(&self) -> Option<&Arc<Store>> {
        match self {
            Scope::Store(store) => Some(store),
            _ => None,
        }
    }

    pub fn website(&self) -> Option<&Arc<Website>> {
        match self {
            Scope::Website(website) => Some(website),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "{}:{}", self.scope_type(), id),
            None => f.write_str(self.scope_type().as_str()),
        }
    }
}
