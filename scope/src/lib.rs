//! Scope resolution for store/website/default configuration contexts.
//!
//! The [`ScopeResolver`] decides which scope applies to the executing request,
//! honoring an explicit pin before falling back to the area code, request
//! parameters and the registry's ambient store/website.

pub mod area;
pub mod config;
pub mod config_value;
pub mod error;
pub mod metrics_defs;
pub mod registry;
pub mod resolver;
mod store_resolver;
pub mod types;
mod website_resolver;

#[cfg(test)]
mod testutils;

pub use area::AreaCode;
pub use error::{EntityKind, ScopeError};
pub use registry::{InMemoryScopeRegistry, RequestParams, ScopeRegistry};
pub use resolver::ScopeResolver;
pub use types::{Scope, ScopeType, Store, Website};
