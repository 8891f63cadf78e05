//! Single-flight token refresh
//!
//! Any number of tenant requests can fail with 401/403 at the same time.
//! The first one to reach the coordinator starts a refresh; every later one
//! joins that same in-flight future. When the refresh settles the
//! coordinator goes back to idle before any waiter sees the outcome, so a
//! later, unrelated failure starts a fresh refresh instead of reusing a
//! settled one.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::transport::Transport;
use crate::api::types::{ApiRequest, ApiResponse};
use crate::core::config::AuthEndpoints;
use crate::session::{Namespace, SessionStore};

use super::attacher::CredentialAttacher;
use super::escalator::FailureEscalator;

/// Obtains a new tenant credential
#[async_trait]
pub trait TokenRefresher: Send + Sync + fmt::Debug {
    /// New credential, or `None` when the refresh was denied or failed
    async fn refresh(&self) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    token: String,
}

/// Calls the refresh endpoint with the current tenant credential
#[derive(Debug)]
pub struct HttpRefresher {
    transport: Arc<dyn Transport>,
    attacher: CredentialAttacher,
    endpoint: String,
}

impl HttpRefresher {
    pub fn new(
        transport: Arc<dyn Transport>,
        tenant: Arc<SessionStore>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            attacher: CredentialAttacher::new(tenant),
            endpoint: endpoint.into(),
        }
    }

    async fn request_token(&self) -> Result<String, ApiError> {
        let request = ApiRequest::post(self.endpoint.as_str());
        let request = self.attacher.attach(&request)?.into_owned();
        let response = self
            .transport
            .send(request)
            .await
            .and_then(ApiResponse::error_for_status)?;
        let body: RefreshResponse = response.json()?;
        if body.token.trim().is_empty() {
            return Err(ApiError::Decode("refresh response has an empty token".to_string()));
        }
        Ok(body.token)
    }
}

#[async_trait]
impl TokenRefresher for HttpRefresher {
    async fn refresh(&self) -> Option<String> {
        match self.request_token().await {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh call failed");
                None
            }
        }
    }
}

/// Endpoints whose failures must never trigger a refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshExemptions {
    paths: Vec<String>,
}

impl RefreshExemptions {
    pub fn new(endpoints: &AuthEndpoints) -> Self {
        Self {
            paths: vec![
                endpoints.login.clone(),
                endpoints.register.clone(),
                endpoints.refresh.clone(),
                endpoints.platform_login.clone(),
            ],
        }
    }

    pub fn is_exempt(&self, request: &ApiRequest) -> bool {
        let route = request.route();
        let route = route.strip_prefix('/').unwrap_or(route);
        self.paths.iter().any(|path| {
            let path = path.trim_start_matches('/');
            route
                .strip_prefix(path)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

type SharedRefresh = Shared<BoxFuture<'static, Option<String>>>;

/// In-flight refresh tagged with the attempt that launched it
type PendingRefresh = Arc<Mutex<Option<(u64, SharedRefresh)>>>;

/// Resets the coordinator to idle when the refresh settles, including by panic.
///
/// Only clears `pending` while it still holds this attempt; a refresh started
/// after a `reset()` belongs to a later attempt and is left alone.
struct SettleGuard {
    pending: PendingRefresh,
    attempt: u64,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        let settled = {
            let mut pending = self.pending.lock();
            match pending.as_ref() {
                Some((attempt, _)) if *attempt == self.attempt => pending.take(),
                _ => None,
            }
        };
        // Dropped outside the lock
        drop(settled);
    }
}

/// De-duplicates tenant token refreshes across concurrent failures
pub struct RefreshCoordinator {
    tenant: Arc<SessionStore>,
    refresher: Arc<dyn TokenRefresher>,
    escalator: FailureEscalator,
    exemptions: RefreshExemptions,
    pending: PendingRefresh,
    started: AtomicU64,
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refresher", &self.refresher)
            .field("exemptions", &self.exemptions)
            .field("refreshing", &self.is_refreshing())
            .field("started", &self.refresh_count())
            .finish()
    }
}

impl RefreshCoordinator {
    pub fn new(
        tenant: Arc<SessionStore>,
        refresher: Arc<dyn TokenRefresher>,
        escalator: FailureEscalator,
        exemptions: RefreshExemptions,
    ) -> Self {
        Self {
            tenant,
            refresher,
            escalator,
            exemptions,
            pending: Arc::new(Mutex::new(None)),
            started: AtomicU64::new(0),
        }
    }

    /// Whether an auth failure on `request` may be recovered by a refresh
    pub fn is_eligible(&self, namespace: Namespace, request: &ApiRequest) -> bool {
        namespace == Namespace::Tenant && !self.exemptions.is_exempt(request)
    }

    pub fn is_refreshing(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Number of refresh calls started since construction
    pub fn refresh_count(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// Drop any in-flight refresh handle and return to idle
    pub fn reset(&self) {
        // The handle may be the last one; dropping it runs the refresh's
        // settle guard, which takes the same lock
        let stale = self.pending.lock().take();
        drop(stale);
    }

    /// Wait for a refreshed credential, starting the refresh if none is in flight.
    ///
    /// On `None` the tenant session has already been logged out, once for the
    /// whole batch of waiters.
    pub async fn refreshed_credential(&self) -> Option<String> {
        let refresh = self.join_or_start();
        refresh.await
    }

    fn join_or_start(&self) -> SharedRefresh {
        // Check and set under one lock with no await in between
        let mut pending = self.pending.lock();
        if let Some((attempt, in_flight)) = pending.as_ref() {
            tracing::debug!(attempt, "Joining in-flight token refresh");
            return in_flight.clone();
        }

        let attempt = self.started.fetch_add(1, Ordering::Relaxed) + 1;
        let refresh = self.launch(attempt).boxed().shared();
        *pending = Some((attempt, refresh.clone()));
        refresh
    }

    fn launch(&self, attempt: u64) -> impl Future<Output = Option<String>> + Send + 'static {
        let refresher = Arc::clone(&self.refresher);
        let tenant = Arc::clone(&self.tenant);
        let escalator = self.escalator.clone();
        let settle = SettleGuard {
            pending: Arc::clone(&self.pending),
            attempt,
        };

        async move {
            tracing::info!(attempt, "Refreshing tenant credential");
            let outcome = refresher.refresh().await;

            match &outcome {
                Some(token) => {
                    tenant.set_credential(token.as_str());
                    tracing::info!(attempt, "Token refresh succeeded");
                }
                None => {
                    tracing::warn!(attempt, "Token refresh denied");
                    escalator.force_logout(Namespace::Tenant);
                }
            }

            drop(settle);
            outcome
        }
    }
}
