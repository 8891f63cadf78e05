//! In-memory session state with write-through persistence

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::core::constants::{STORAGE_KEY_PLATFORM_TOKEN, STORAGE_KEY_TENANT_SESSION};
use crate::data::SessionBackend;

use super::types::{Namespace, Principal, Session};

/// Durable shape of the tenant session blob
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    #[serde(default)]
    user: Option<Principal>,
}

/// Holds one namespace's session.
///
/// Reads never block on I/O and never fail. Every mutation updates memory and
/// writes through to the backend before returning. A storage failure is
/// logged and the in-memory state still changes.
///
/// Backend I/O runs after the state lock is released; `persisting` keeps
/// writes in mutation order.
#[derive(Debug)]
pub struct SessionStore {
    namespace: Namespace,
    backend: Arc<dyn SessionBackend>,
    state: RwLock<Session>,
    persisting: Mutex<()>,
}

impl SessionStore {
    /// Open a store, reading the durable value once.
    ///
    /// Missing or unreadable values mean "no session".
    pub fn open(namespace: Namespace, backend: Arc<dyn SessionBackend>) -> Self {
        let state = Self::restore(namespace, backend.as_ref());
        tracing::debug!(
            namespace = %namespace,
            authenticated = state.has_credential(),
            "Session restored"
        );
        Self {
            namespace,
            backend,
            state: RwLock::new(state),
            persisting: Mutex::new(()),
        }
    }

    pub fn tenant(backend: Arc<dyn SessionBackend>) -> Self {
        Self::open(Namespace::Tenant, backend)
    }

    pub fn platform(backend: Arc<dyn SessionBackend>) -> Self {
        Self::open(Namespace::Platform, backend)
    }

    fn storage_key(namespace: Namespace) -> &'static str {
        match namespace {
            Namespace::Tenant => STORAGE_KEY_TENANT_SESSION,
            Namespace::Platform => STORAGE_KEY_PLATFORM_TOKEN,
        }
    }

    fn restore(namespace: Namespace, backend: &dyn SessionBackend) -> Session {
        let raw = match backend.read(Self::storage_key(namespace)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Session::default(),
            Err(e) => {
                tracing::warn!(namespace = %namespace, error = %e, "Failed to read stored session");
                return Session::default();
            }
        };

        match namespace {
            Namespace::Tenant => match serde_json::from_str::<StoredSession>(&raw) {
                Ok(stored) if !stored.token.trim().is_empty() => Session {
                    credential: Some(stored.token),
                    identity: stored.user,
                },
                Ok(_) => Session::default(),
                Err(e) => {
                    tracing::warn!(error = %e, "Stored tenant session is corrupt, ignoring");
                    Session::default()
                }
            },
            Namespace::Platform => {
                let token = raw.trim();
                if token.is_empty() {
                    Session::default()
                } else {
                    Session {
                        credential: Some(token.to_string()),
                        identity: None,
                    }
                }
            }
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Current snapshot
    pub fn current(&self) -> Session {
        self.state.read().clone()
    }

    pub fn credential(&self) -> Option<String> {
        self.state.read().credential.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    /// Replace the whole session. The platform namespace carries no identity.
    pub fn login(&self, credential: impl Into<String>, identity: Option<Principal>) {
        let identity = match self.namespace {
            Namespace::Tenant => identity,
            Namespace::Platform => None,
        };
        let session = Session {
            credential: Some(credential.into()),
            identity,
        };
        self.update(|state| *state = session);
        tracing::info!(namespace = %self.namespace, "Signed in");
    }

    /// Clear the session and remove its durable value
    pub fn logout(&self) {
        self.update(|state| *state = Session::default());
        tracing::info!(namespace = %self.namespace, "Signed out");
    }

    /// Swap in a refreshed credential, keeping the identity
    pub(crate) fn set_credential(&self, credential: impl Into<String>) {
        let credential = credential.into();
        self.update(|state| state.credential = Some(credential));
        tracing::debug!(namespace = %self.namespace, "Credential replaced");
    }

    fn update(&self, mutate: impl FnOnce(&mut Session)) {
        let mut state = self.state.write();
        mutate(&mut state);
        let snapshot = state.clone();

        // Taken before the state lock is released so writes land in order
        let _writing = self.persisting.lock();
        drop(state);
        self.persist(&snapshot);
    }

    fn persist(&self, state: &Session) {
        let key = Self::storage_key(self.namespace);
        let result = match (&state.credential, self.namespace) {
            (None, _) => self.backend.remove(key),
            (Some(token), Namespace::Platform) => self.backend.write(key, token),
            (Some(token), Namespace::Tenant) => {
                let stored = StoredSession {
                    token: token.clone(),
                    user: state.identity.clone(),
                };
                match serde_json::to_string(&stored) {
                    Ok(json) => self.backend.write(key, &json),
                    Err(e) => Err(crate::data::StorageError::Serialization(e.to_string())),
                }
            }
        };

        if let Err(e) = result {
            tracing::warn!(
                namespace = %self.namespace,
                backend = self.backend.name(),
                error = %e,
                "Failed to persist session"
            );
        }
    }
}
