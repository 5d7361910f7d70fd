//! Klevu integration: API keys per scope, account lookup, account feature
//! caching and the web API exposing them.

pub mod account;
pub mod account_feature_cache;
pub mod account_lookup;
pub mod api;
pub mod api_keys;
pub mod cache;
pub mod cache_key;
pub mod config;
pub mod errors;
pub mod integration;
pub mod metrics_defs;
pub mod serializer;
pub mod status;

#[cfg(test)]
mod testutils;

pub use errors::{IntegrationError, Result};
