//! Tenant and platform-admin sessions

mod store;
mod types;

pub use store::SessionStore;
pub use types::{Namespace, Principal, Role, Session, Subscription};

use std::sync::Arc;

use crate::data::SessionBackend;

/// Both session namespaces, opened against one backend
#[derive(Debug, Clone)]
pub struct Sessions {
    pub tenant: Arc<SessionStore>,
    pub platform: Arc<SessionStore>,
}

impl Sessions {
    pub fn open(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            tenant: Arc::new(SessionStore::tenant(backend.clone())),
            platform: Arc::new(SessionStore::platform(backend)),
        }
    }

    pub fn store(&self, namespace: Namespace) -> &Arc<SessionStore> {
        match namespace {
            Namespace::Tenant => &self.tenant,
            Namespace::Platform => &self.platform,
        }
    }
}
