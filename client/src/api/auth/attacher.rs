//! Bearer credential attachment

use std::borrow::Cow;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::types::ApiRequest;
use crate::session::{Namespace, SessionStore};

/// Routes a request path to exactly one session namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceResolver {
    platform_prefix: String,
}

impl NamespaceResolver {
    pub fn new(platform_prefix: impl Into<String>) -> Self {
        let prefix = platform_prefix.into();
        Self {
            platform_prefix: format!("/{}", prefix.trim_matches('/')),
        }
    }

    pub fn resolve(&self, request: &ApiRequest) -> Namespace {
        let route = request.route();
        let route = if route.starts_with('/') {
            Cow::Borrowed(route)
        } else {
            Cow::Owned(format!("/{}", route))
        };

        let platform = route
            .strip_prefix(self.platform_prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
        if platform {
            Namespace::Platform
        } else {
            Namespace::Tenant
        }
    }
}

/// Adds `Authorization: Bearer <credential>` for one namespace
#[derive(Debug, Clone)]
pub struct CredentialAttacher {
    store: Arc<SessionStore>,
}

impl CredentialAttacher {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    pub fn namespace(&self) -> Namespace {
        self.store.namespace()
    }

    /// Borrowed when the request goes out unchanged, owned when a header was added
    pub fn attach<'a>(&self, request: &'a ApiRequest) -> Result<Cow<'a, ApiRequest>, ApiError> {
        if request.has_authorization() {
            tracing::debug!(path = %request.route(), "Caller supplied Authorization, passing through");
            return Ok(Cow::Borrowed(request));
        }

        match self.store.credential() {
            Some(token) => {
                tracing::debug!(
                    namespace = %self.namespace(),
                    path = %request.route(),
                    "Attaching bearer credential"
                );
                Ok(Cow::Owned(request.with_bearer(&token)?))
            }
            None => Ok(Cow::Borrowed(request)),
        }
    }
}
