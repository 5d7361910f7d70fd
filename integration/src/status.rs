use crate::account::AccountFeatures;
use crate::account_feature_cache::AccountFeatureCache;
use crate::api_keys::ApiKeyProvider;
use crate::cache_key::CacheKeyError;
use scope::{ScopeRegistry, ScopeType};
use serde::Serialize;
use std::sync::Arc;

/// One row of the integration status grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreIntegrationStatus {
    pub store_id: u32,
    pub store_code: String,
    pub store_name: String,
    pub website_id: u32,
    pub website_code: String,
    pub js_api_key: Option<String>,
    /// Where the JS API key in effect is stored, if anywhere.
    pub key_source: Option<ScopeType>,
    pub integrated: bool,
    pub account_features: Option<AccountFeatures>,
}

pub struct IntegrationStatusProvider {
    registry: Arc<dyn ScopeRegistry>,
    provider: ApiKeyProvider,
    feature_cache: AccountFeatureCache,
}

impl IntegrationStatusProvider {
    pub fn new(
        registry: Arc<dyn ScopeRegistry>,
        provider: ApiKeyProvider,
        feature_cache: AccountFeatureCache,
    ) -> Self {
        IntegrationStatusProvider {
            registry,
            provider,
            feature_cache,
        }
    }

    /// Status of every store, ordered by store id.
    pub fn get_status(&self) -> Result<Vec<StoreIntegrationStatus>, CacheKeyError> {
        self.registry
            .stores()
            .into_iter()
            .map(|store| -> Result<StoreIntegrationStatus, CacheKeyError> {
                let website = self.registry.get_website_by_id(store.website_id)?;
                let keys = self.provider.get(ScopeType::Stores, store.id);
                let key_source = self
                    .provider
                    .key_source(ScopeType::Stores, store.id)
                    .map(|(scope_type, _)| scope_type);
                let account_features = self
                    .feature_cache
                    .load(store.id, ScopeType::Stores.as_str())?;

                Ok(StoreIntegrationStatus {
                    store_id: store.id,
                    store_code: store.code.clone(),
                    store_name: store.name.clone(),
                    website_id: website.id,
                    website_code: website.code.clone(),
                    integrated: keys.is_some(),
                    js_api_key: keys.map(|keys| keys.js_api_key),
                    key_source,
                    account_features,
                })
            })
            .collect()
    }
}
