use crate::config::Config;
use integration::account_feature_cache::AccountFeatureCache;
use integration::account_lookup::{AccountLookup, HttpAccountLookup};
use integration::api::ApiState;
use integration::api_keys::{ApiKeyProvider, ApiKeyStorage};
use integration::cache::MokaCache;
use integration::cache_key::CacheKeyResolver;
use integration::integration::IntegrationService;
use integration::serializer::JsonSerializer;
use integration::status::IntegrationStatusProvider;
use scope::config_value::InMemoryConfigStore;
use scope::{InMemoryScopeRegistry, ScopeRegistry};
use std::sync::Arc;
use std::time::Duration;

/// Everything the web API needs, wired from one config.
pub struct Services {
    pub registry: Arc<dyn ScopeRegistry>,
    pub integration: Arc<IntegrationService>,
    pub status: Arc<IntegrationStatusProvider>,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self, crate::CliError> {
        let registry: Arc<dyn ScopeRegistry> =
            Arc::new(InMemoryScopeRegistry::from_config(&config.stores)?);
        let lookup: Arc<dyn AccountLookup> =
            Arc::new(HttpAccountLookup::new(&config.integration.account_lookup)?);

        let values = Arc::new(InMemoryConfigStore::new(registry.clone()));
        let provider = ApiKeyProvider::new(values.clone(), registry.clone());
        let feature_cache = AccountFeatureCache::new(
            Arc::new(MokaCache::new(config.integration.cache.max_capacity)),
            Arc::new(JsonSerializer),
            CacheKeyResolver::new(registry.clone()),
            Duration::from_secs(config.integration.cache.ttl_secs),
        );

        let integration = IntegrationService::new(
            registry.clone(),
            lookup,
            provider.clone(),
            ApiKeyStorage::new(values),
            feature_cache.clone(),
        );
        let status = IntegrationStatusProvider::new(registry.clone(), provider, feature_cache);

        Ok(Services {
            registry,
            integration: Arc::new(integration),
            status: Arc::new(status),
        })
    }

    pub fn api_state(&self) -> ApiState {
        ApiState::new(self.integration.clone(), self.status.clone())
    }
}
