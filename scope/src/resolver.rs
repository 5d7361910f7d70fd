use crate::area::AreaCode;
use crate::error::ScopeError;
use crate::metrics_defs::{SCOPE_PINNED, SCOPE_RESOLVED};
use crate::registry::{RequestParams, ScopeRegistry};
use crate::store_resolver::StoreScopeResolver;
use crate::types::{Scope, ScopeType};
use crate::website_resolver::WebsiteScopeResolver;
use shared::counter;
use std::sync::Arc;

/// What a scope setter should pin once the scope type literal is understood.
enum PinTarget {
    Store,
    Website,
    DefaultStoreView,
}

/// Resolves the configuration scope of the executing request.
///
/// A resolver belongs to a single request. The pin it holds is plain state on
/// the instance, at most one of the store and website axes is pinned at any
/// time, and it is dropped together with the resolver.
///
/// Resolution order:
/// 1. a pinned store or website,
/// 2. the store derived from the environment,
/// 3. the website derived from the environment,
/// 4. the default scope.
pub struct ScopeResolver {
    registry: Arc<dyn ScopeRegistry>,
    area: AreaCode,
    request: Arc<dyn RequestParams>,
    store_resolver: StoreScopeResolver,
    website_resolver: WebsiteScopeResolver,
}

impl ScopeResolver {
    pub fn new(
        registry: Arc<dyn ScopeRegistry>,
        area: AreaCode,
        request: Arc<dyn RequestParams>,
    ) -> Self {
        ScopeResolver {
            store_resolver: StoreScopeResolver::new(registry.clone()),
            website_resolver: WebsiteScopeResolver::new(registry.clone()),
            registry,
            area,
            request,
        }
    }

    pub fn area(&self) -> &AreaCode {
        &self.area
    }

    pub fn registry(&self) -> &Arc<dyn ScopeRegistry> {
        &self.registry
    }

    pub fn get_current_scope(&self) -> Result<Scope, ScopeError> {
        if let Some(store) = self.store_resolver.pinned() {
            counter!(SCOPE_RESOLVED, "source" => "pin").increment(1);
            return Ok(Scope::Store(store.clone()));
        }
        if let Some(website) = self.website_resolver.pinned() {
            counter!(SCOPE_RESOLVED, "source" => "pin").increment(1);
            return Ok(Scope::Website(website.clone()));
        }

        let request = self.request.as_ref();

        if let Some(store) = self.store_resolver.environment_store(&self.area, request)? {
            counter!(SCOPE_RESOLVED, "source" => "store").increment(1);
            return Ok(Scope::Store(store));
        }
        if let Some(website) = self
            .website_resolver
            .environment_website(&self.area, request)?
        {
            counter!(SCOPE_RESOLVED, "source" => "website").increment(1);
            return Ok(Scope::Website(website));
        }

        counter!(SCOPE_RESOLVED, "source" => "default").increment(1);
        Ok(Scope::Default)
    }

    /// Pins `scope`. Pinning the default scope clears any pin.
    pub fn set_current_scope(&mut self, scope: &Scope) {
        match scope {
            Scope::Store(store) => {
                self.website_resolver.unpin();
                self.store_resolver.pin(store.clone());
            }
            Scope::Website(website) => {
                self.store_resolver.unpin();
                self.website_resolver.pin(website.clone());
            }
            Scope::Default => self.unset_current_scope(),
        }

        counter!(SCOPE_PINNED, "scope_type" => scope.scope_type().as_str()).increment(1);
        tracing::debug!(area = %self.area, %scope, "Pinned current scope");
    }

    pub fn set_current_scope_by_id(
        &mut self,
        id: u32,
        scope_type: &str,
    ) -> Result<Scope, ScopeError> {
        let scope = match self.pin_target(scope_type)? {
            PinTarget::Store => Scope::Store(self.registry.get_store_by_id(id)?),
            PinTarget::Website => Scope::Website(self.registry.get_website_by_id(id)?),
            PinTarget::DefaultStoreView => Scope::Store(self.registry.default_store_view()?),
        };
        self.set_current_scope(&scope);
        Ok(scope)
    }

    pub fn set_current_scope_by_code(
        &mut self,
        code: &str,
        scope_type: &str,
    ) -> Result<Scope, ScopeError> {
        let scope = match self.pin_target(scope_type)? {
            PinTarget::Store => Scope::Store(self.registry.get_store_by_code(code)?),
            PinTarget::Website => Scope::Website(self.registry.get_website_by_code(code)?),
            PinTarget::DefaultStoreView => Scope::Store(self.registry.default_store_view()?),
        };
        self.set_current_scope(&scope);
        Ok(scope)
    }

    /// Clears both the store and the website pin.
    pub fn unset_current_scope(&mut self) {
        self.store_resolver.unpin();
        self.website_resolver.unpin();
    }

    pub fn pinned_scope(&self) -> Option<Scope> {
        self.store_resolver
            .pinned()
            .map(|store| Scope::Store(store.clone()))
            .or_else(|| {
                self.website_resolver
                    .pinned()
                    .map(|website| Scope::Website(website.clone()))
            })
    }

    fn pin_target(&self, scope_type: &str) -> Result<PinTarget, ScopeError> {
        match ScopeType::from_literal(scope_type) {
            Some(ScopeType::Stores) => Ok(PinTarget::Store),
            Some(ScopeType::Websites) => Ok(PinTarget::Website),
            // Single store installs keep their values on the only store view
            Some(ScopeType::Default) if self.registry.is_single_store_mode() => {
                Ok(PinTarget::DefaultStoreView)
            }
            _ => Err(ScopeError::InvalidArgument(scope_type.to_string())),
        }
    }
}
