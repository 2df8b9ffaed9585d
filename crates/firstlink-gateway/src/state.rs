use std::sync::Arc;

use firstlink_admin::AdminService;
use firstlink_core::{FirstVisitPolicy, RedirectAdmin, Repository, ResolutionStore};
use firstlink_redirector::{Redirector, RedirectorService};

#[derive(Clone)]
pub struct AppState {
    redirector: Arc<dyn Redirector>,
    admin: Arc<dyn RedirectAdmin>,
    public_base_url: Option<String>,
}

impl AppState {
    pub fn new(redirector: Arc<dyn Redirector>, admin: Arc<dyn RedirectAdmin>) -> Self {
        Self {
            redirector,
            admin,
            public_base_url: None,
        }
    }

    /// Wires the resolution engine and the admin service to one shared store.
    pub fn from_store<S>(store: S, policy: FirstVisitPolicy) -> Self
    where
        S: Repository + ResolutionStore + Clone,
    {
        Self::new(
            Arc::new(RedirectorService::new(store.clone(), policy)),
            Arc::new(AdminService::new(store)),
        )
    }

    /// Uses a fixed base URL for short links instead of the request's host.
    pub fn with_public_base_url(mut self, public_base_url: impl Into<String>) -> Self {
        self.public_base_url = Some(public_base_url.into());
        self
    }

    pub fn redirector(&self) -> &dyn Redirector {
        self.redirector.as_ref()
    }

    pub fn admin(&self) -> &dyn RedirectAdmin {
        self.admin.as_ref()
    }

    pub fn public_base_url(&self) -> Option<&str> {
        self.public_base_url.as_deref()
    }
}
