use crate::area::AreaCode;
use crate::error::ScopeError;
use crate::registry::{RequestParams, ScopeRegistry};
use crate::types::Website;
use std::sync::Arc;

const WEBSITE_PARAMS: &[&str] = &["website", "website_id"];

/// Website axis of scope resolution.
pub(crate) struct WebsiteScopeResolver {
    registry: Arc<dyn ScopeRegistry>,
    pinned: Option<Arc<Website>>,
}

impl WebsiteScopeResolver {
    pub fn new(registry: Arc<dyn ScopeRegistry>) -> Self {
        WebsiteScopeResolver {
            registry,
            pinned: None,
        }
    }

    pub fn pinned(&self) -> Option<&Arc<Website>> {
        self.pinned.as_ref()
    }

    pub fn pin(&mut self, website: Arc<Website>) {
        self.pinned = Some(website);
    }

    pub fn unpin(&mut self) {
        self.pinned = None;
    }

    /// The website derived from the area and the request.
    ///
    /// In single-store admin this is the website of the default store view.
    /// `ScopeResolver` never reaches that branch, because the store axis always
    /// resolves first there.
    pub fn environment_website(
        &self,
        area: &AreaCode,
        request: &dyn RequestParams,
    ) -> Result<Option<Arc<Website>>, ScopeError> {
        match area {
            area if area.is_scopeless() => Ok(None),
            AreaCode::Adminhtml => {
                if self.registry.is_single_store_mode() {
                    let store = self.registry.default_store_view()?;
                    return self.registry.get_website_by_id(store.website_id).map(Some);
                }
                request
                    .get_id_param(WEBSITE_PARAMS)
                    .map(|id| self.registry.get_website_by_id(id))
                    .transpose()
            }
            _ => Ok(self.registry.current_website()),
        }
    }
}
