use crate::account::AccountFeatures;
use crate::cache::KeyValueCache;
use crate::cache_key::{CacheKeyError, CacheKeyResolver, website_fallback_key};
use crate::errors::Result;
use crate::metrics_defs::{
    ACCOUNT_FEATURES_CACHE_HIT, ACCOUNT_FEATURES_CACHE_INVALID, ACCOUNT_FEATURES_CACHE_MISS,
};
use crate::serializer::Serializer;
use serde_json::{Map, Value};
use shared::counter;
use std::sync::Arc;
use std::time::Duration;

/// Field of the cached payload holding the features.
pub const ACCOUNT_FEATURES_FIELD: &str = "account_features";
pub const ACCOUNT_FEATURES_CACHE_TAG: &str = "klevu_account_features";

/// Account features cached per store or website.
///
/// Store level lookups fall back to the website entry once when the store has
/// nothing cached. Scope errors are returned to the caller, never logged here.
#[derive(Clone)]
pub struct AccountFeatureCache {
    cache: Arc<dyn KeyValueCache>,
    serializer: Arc<dyn Serializer>,
    keys: CacheKeyResolver,
    ttl: Duration,
}

impl AccountFeatureCache {
    pub fn new(
        cache: Arc<dyn KeyValueCache>,
        serializer: Arc<dyn Serializer>,
        keys: CacheKeyResolver,
        ttl: Duration,
    ) -> Self {
        AccountFeatureCache {
            cache,
            serializer,
            keys,
            ttl,
        }
    }

    pub fn load(
        &self,
        scope_id: u32,
        scope_type: &str,
    ) -> Result<Option<AccountFeatures>, CacheKeyError> {
        let key = self.keys.derive_key(scope_id, scope_type)?;

        let (data, tier) = match self.cache.load(&key) {
            Some(data) => (data, "exact"),
            None => match website_fallback_key(&key).and_then(|key| self.cache.load(key)) {
                Some(data) => (data, "website"),
                None => {
                    counter!(ACCOUNT_FEATURES_CACHE_MISS).increment(1);
                    return Ok(None);
                }
            },
        };

        let features = self
            .serializer
            .deserialize(&data)
            .ok()
            .and_then(|mut payload| payload.remove(ACCOUNT_FEATURES_FIELD))
            .and_then(|value| serde_json::from_value::<AccountFeatures>(value).ok());

        match features {
            Some(features) => {
                counter!(ACCOUNT_FEATURES_CACHE_HIT, "tier" => tier).increment(1);
                Ok(Some(features))
            }
            None => {
                counter!(ACCOUNT_FEATURES_CACHE_INVALID).increment(1);
                Ok(None)
            }
        }
    }

    pub fn save(&self, features: &AccountFeatures, scope_id: u32, scope_type: &str) -> Result<()> {
        let key = self.keys.derive_key(scope_id, scope_type)?;

        let mut payload = Map::new();
        payload.insert(
            ACCOUNT_FEATURES_FIELD.to_string(),
            serde_json::to_value(features)?,
        );
        let data = self.serializer.serialize(&Value::Object(payload))?;
        self.cache
            .save(&key, &data, &[ACCOUNT_FEATURES_CACHE_TAG], self.ttl);
        Ok(())
    }

    /// Drops every cached account feature entry.
    pub fn clear(&self) {
        self.cache.clean(ACCOUNT_FEATURES_CACHE_TAG);
    }
}
