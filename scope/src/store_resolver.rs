use crate::area::AreaCode;
use crate::error::ScopeError;
use crate::registry::{RequestParams, ScopeRegistry};
use crate::types::Store;
use std::sync::Arc;

const STORE_PARAMS: &[&str] = &["store", "store_id"];

/// Store axis of scope resolution.
pub(crate) struct StoreScopeResolver {
    registry: Arc<dyn ScopeRegistry>,
    pinned: Option<Arc<Store>>,
}

impl StoreScopeResolver {
    pub fn new(registry: Arc<dyn ScopeRegistry>) -> Self {
        StoreScopeResolver {
            registry,
            pinned: None,
        }
    }

    pub fn pinned(&self) -> Option<&Arc<Store>> {
        self.pinned.as_ref()
    }

    pub fn pin(&mut self, store: Arc<Store>) {
        self.pinned = Some(store);
    }

    pub fn unpin(&mut self) {
        self.pinned = None;
    }

    /// The store derived from the area and the request. Pins are checked by
    /// the caller before this.
    pub fn environment_store(
        &self,
        area: &AreaCode,
        request: &dyn RequestParams,
    ) -> Result<Option<Arc<Store>>, ScopeError> {
        match area {
            area if area.is_scopeless() => Ok(None),
            AreaCode::Adminhtml => {
                if self.registry.is_single_store_mode() {
                    return self.registry.default_store_view().map(Some);
                }
                request
                    .get_id_param(STORE_PARAMS)
                    .map(|id| self.registry.get_store_by_id(id))
                    .transpose()
            }
            _ => Ok(self.registry.current_store()),
        }
    }
}
