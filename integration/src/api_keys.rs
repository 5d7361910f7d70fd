use crate::account::{Account, ApiKeys};
use scope::config_value::{ConfigValueReader, ConfigValueWriter};
use scope::{Scope, ScopeError, ScopeRegistry, ScopeResolver, ScopeType};
use std::sync::Arc;

pub const JS_API_KEY_PATH: &str = "klevu_configuration/auth_keys/js_api_key";
pub const REST_AUTH_KEY_PATH: &str = "klevu_configuration/auth_keys/rest_auth_key";

const URL_INDEXING_PATH: &str = "klevu_configuration/developer/url_indexing";
const URL_SEARCH_PATH: &str = "klevu_configuration/developer/url_search";
const URL_CAT_NAV_PATH: &str = "klevu_configuration/developer/url_cat_nav";
const URL_ANALYTICS_PATH: &str = "klevu_configuration/developer/url_analytics";
const URL_JS_PATH: &str = "klevu_configuration/developer/url_js";
const URL_TIERS_PATH: &str = "klevu_configuration/developer/url_tiers";

const ENDPOINT_URL_PATHS: [&str; 6] = [
    URL_INDEXING_PATH,
    URL_SEARCH_PATH,
    URL_CAT_NAV_PATH,
    URL_ANALYTICS_PATH,
    URL_JS_PATH,
    URL_TIERS_PATH,
];

/// Reads API keys stored in scoped configuration.
///
/// Keys are inherited store → website → default. A scope only has keys when
/// both of them are in effect.
#[derive(Clone)]
pub struct ApiKeyProvider {
    reader: Arc<dyn ConfigValueReader>,
    registry: Arc<dyn ScopeRegistry>,
}

impl ApiKeyProvider {
    pub fn new(reader: Arc<dyn ConfigValueReader>, registry: Arc<dyn ScopeRegistry>) -> Self {
        ApiKeyProvider { reader, registry }
    }

    pub fn get(&self, scope_type: ScopeType, scope_id: u32) -> Option<ApiKeys> {
        let js_api_key = self.reader.get_value(JS_API_KEY_PATH, scope_type, scope_id)?;
        let rest_auth_key = self
            .reader
            .get_value(REST_AUTH_KEY_PATH, scope_type, scope_id)?;
        Some(ApiKeys::new(js_api_key, rest_auth_key))
    }

    pub fn get_for_scope(&self, scope: &Scope) -> Option<ApiKeys> {
        self.get(scope.scope_type(), scope.config_id())
    }

    pub fn get_for_current_scope(
        &self,
        resolver: &ScopeResolver,
    ) -> Result<Option<ApiKeys>, ScopeError> {
        Ok(self.get_for_scope(&resolver.get_current_scope()?))
    }

    /// The scope the JS API key in effect at `scope_type`/`scope_id` is stored at.
    pub fn key_source(&self, scope_type: ScopeType, scope_id: u32) -> Option<(ScopeType, u32)> {
        let mut chain = vec![(scope_type, scope_id)];
        if scope_type == ScopeType::Stores
            && let Ok(store) = self.registry.get_store_by_id(scope_id)
        {
            chain.push((ScopeType::Websites, store.website_id));
        }
        if scope_type != ScopeType::Default {
            chain.push((ScopeType::Default, 0));
        }

        chain.into_iter().find(|(scope_type, scope_id)| {
            self.reader
                .get_exact_value(JS_API_KEY_PATH, *scope_type, *scope_id)
                .is_some()
        })
    }

    /// Scopes other than `scope_type`/`scope_id` that store `js_api_key`.
    pub fn other_scopes_with_key(
        &self,
        js_api_key: &str,
        scope_type: ScopeType,
        scope_id: u32,
    ) -> Vec<(ScopeType, u32)> {
        self.reader
            .find_scopes(JS_API_KEY_PATH, js_api_key)
            .into_iter()
            .filter(|scope| *scope != (scope_type, scope_id))
            .collect()
    }
}

/// Writes API keys and the account endpoint URLs at a single scope.
#[derive(Clone)]
pub struct ApiKeyStorage {
    writer: Arc<dyn ConfigValueWriter>,
}

impl ApiKeyStorage {
    pub fn new(writer: Arc<dyn ConfigValueWriter>) -> Self {
        ApiKeyStorage { writer }
    }

    pub fn save(&self, keys: &ApiKeys, account: &Account, scope_type: ScopeType, scope_id: u32) {
        self.writer
            .save_value(JS_API_KEY_PATH, &keys.js_api_key, scope_type, scope_id);
        self.writer
            .save_value(REST_AUTH_KEY_PATH, &keys.rest_auth_key, scope_type, scope_id);

        let urls = [
            &account.indexing_url,
            &account.search_url,
            &account.smart_category_merchandising_url,
            &account.analytics_url,
            &account.js_url,
            &account.tiers_url,
        ];
        for (path, url) in ENDPOINT_URL_PATHS.iter().zip(urls) {
            match url {
                Some(url) => self.writer.save_value(path, url, scope_type, scope_id),
                None => {
                    self.writer.delete_value(path, scope_type, scope_id);
                }
            }
        }
    }

    /// Returns whether any keys were stored at the scope.
    pub fn remove(&self, scope_type: ScopeType, scope_id: u32) -> bool {
        let mut removed = false;
        for path in [JS_API_KEY_PATH, REST_AUTH_KEY_PATH] {
            removed |= self.writer.delete_value(path, scope_type, scope_id);
        }
        for path in ENDPOINT_URL_PATHS {
            self.writer.delete_value(path, scope_type, scope_id);
        }
        removed
    }
}
