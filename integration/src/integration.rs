use crate::account::{Account, ApiKeys};
use crate::account_feature_cache::AccountFeatureCache;
use crate::account_lookup::AccountLookup;
use crate::api_keys::{ApiKeyProvider, ApiKeyStorage};
use crate::errors::{IntegrationError, Result};
use crate::metrics_defs::{API_KEYS_INTEGRATED, API_KEYS_REMOVED};
use scope::{AreaCode, RequestParams, Scope, ScopeRegistry, ScopeResolver};
use shared::counter;
use std::collections::HashMap;
use std::sync::Arc;

const SUPPORTED_PLATFORM: &str = "magento";

/// Checks API keys against the account lookup and stores them per scope.
pub struct IntegrationService {
    registry: Arc<dyn ScopeRegistry>,
    lookup: Arc<dyn AccountLookup>,
    provider: ApiKeyProvider,
    storage: ApiKeyStorage,
    feature_cache: AccountFeatureCache,
}

impl IntegrationService {
    pub fn new(
        registry: Arc<dyn ScopeRegistry>,
        lookup: Arc<dyn AccountLookup>,
        provider: ApiKeyProvider,
        storage: ApiKeyStorage,
        feature_cache: AccountFeatureCache,
    ) -> Self {
        IntegrationService {
            registry,
            lookup,
            provider,
            storage,
            feature_cache,
        }
    }

    /// Validates the keys and returns the account they belong to. The account
    /// must be active and set up for this platform.
    pub async fn check_api_keys(&self, keys: &ApiKeys) -> Result<Account> {
        keys.validate()?;

        let account = self.lookup.get_account(keys).await?;
        if !account.active {
            return Err(IntegrationError::AccountInactive);
        }
        if !account.platform.eq_ignore_ascii_case(SUPPORTED_PLATFORM) {
            return Err(IntegrationError::IncorrectPlatform(account.platform));
        }

        Ok(account)
    }

    pub async fn integrate_api_keys(
        &self,
        keys: &ApiKeys,
        scope_id: u32,
        scope_type: &str,
    ) -> Result<Account> {
        let scope = self.target_scope(scope_id, scope_type)?;
        let (scope_type, scope_id) = (scope.scope_type(), scope.config_id());

        let account = self.check_api_keys(keys).await?;

        if let Some((scope_type, scope_id)) = self
            .provider
            .other_scopes_with_key(&keys.js_api_key, scope_type, scope_id)
            .into_iter()
            .next()
        {
            return Err(IntegrationError::AlreadyIntegrated {
                scope_type,
                scope_id,
            });
        }

        self.storage.save(keys, &account, scope_type, scope_id);

        match self.lookup.get_features(keys, &account).await {
            Ok(features) => {
                self.feature_cache
                    .save(&features, scope_id, scope_type.as_str())?;
            }
            Err(error) => {
                tracing::warn!(
                    %scope,
                    error = %error,
                    "Could not fetch account features, they will be fetched on next integration"
                );
            }
        }

        counter!(API_KEYS_INTEGRATED, "scope_type" => scope_type.as_str()).increment(1);
        tracing::info!(
            %scope,
            js_api_key = %keys.js_api_key,
            company = account.company_name.as_deref().unwrap_or(""),
            "Integrated API keys"
        );

        Ok(account)
    }

    /// Removes the keys stored at the scope and drops cached account features.
    /// Returns whether the scope had keys.
    pub fn remove_api_keys(&self, scope_id: u32, scope_type: &str) -> Result<bool> {
        let scope = self.target_scope(scope_id, scope_type)?;

        let removed = self.storage.remove(scope.scope_type(), scope.config_id());
        self.feature_cache.clear();

        if removed {
            counter!(API_KEYS_REMOVED, "scope_type" => scope.scope_type().as_str()).increment(1);
            tracing::info!(%scope, "Removed API keys");
        }

        Ok(removed)
    }

    /// The store or website keys are integrated with. Web API calls carry no
    /// ambient scope, so the scope is pinned on a fresh resolver.
    fn target_scope(&self, scope_id: u32, scope_type: &str) -> Result<Scope> {
        let params: Arc<dyn RequestParams> = Arc::new(HashMap::<String, String>::new());
        let mut resolver = ScopeResolver::new(self.registry.clone(), AreaCode::WebapiRest, params);
        resolver.set_current_scope_by_id(scope_id, scope_type)?;
        Ok(resolver.get_current_scope()?)
    }
}
