//! Authenticated API client: attach, send, recover, escalate

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::api::transport::Transport;
use crate::api::types::{ApiRequest, ApiResponse};
use crate::core::config::ApiConfig;
use crate::routes::Navigator;
use crate::session::{Namespace, Sessions};

use super::attacher::{CredentialAttacher, NamespaceResolver};
use super::escalator::FailureEscalator;
use super::refresh::{HttpRefresher, RefreshCoordinator, RefreshExemptions, TokenRefresher};

/// Entry point for every API call made on behalf of a session.
///
/// Flow per request:
/// 1. pick the namespace from the path and attach its credential,
/// 2. send; success goes straight back to the caller,
/// 3. a retry-eligible 401/403 waits for the shared refresh and is re-sent
///    once with the new credential,
/// 4. everything else goes through the failure escalator.
#[derive(Debug)]
pub struct AuthClient {
    transport: Arc<dyn Transport>,
    sessions: Sessions,
    resolver: NamespaceResolver,
    tenant: CredentialAttacher,
    platform: CredentialAttacher,
    coordinator: RefreshCoordinator,
    escalator: FailureEscalator,
}

impl AuthClient {
    pub fn new(
        config: &ApiConfig,
        transport: Arc<dyn Transport>,
        sessions: Sessions,
        refresher: Arc<dyn TokenRefresher>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let escalator = FailureEscalator::new(sessions.clone(), navigator);
        let coordinator = RefreshCoordinator::new(
            sessions.tenant.clone(),
            refresher,
            escalator.clone(),
            RefreshExemptions::new(&config.endpoints),
        );

        Self {
            resolver: NamespaceResolver::new(config.platform_prefix.as_str()),
            tenant: CredentialAttacher::new(sessions.tenant.clone()),
            platform: CredentialAttacher::new(sessions.platform.clone()),
            transport,
            sessions,
            coordinator,
            escalator,
        }
    }

    /// Client whose refreshes call the configured refresh endpoint
    pub fn with_http_refresher(
        config: &ApiConfig,
        transport: Arc<dyn Transport>,
        sessions: Sessions,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let refresher = Arc::new(HttpRefresher::new(
            transport.clone(),
            sessions.tenant.clone(),
            config.endpoints.refresh.as_str(),
        ));
        Self::new(config, transport, sessions, refresher, navigator)
    }

    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn namespace_of(&self, request: &ApiRequest) -> Namespace {
        self.resolver.resolve(request)
    }

    fn attacher(&self, namespace: Namespace) -> &CredentialAttacher {
        match namespace {
            Namespace::Tenant => &self.tenant,
            Namespace::Platform => &self.platform,
        }
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.transport.send(request).await?.error_for_status()
    }

    /// Send `request` through the session pipeline
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let namespace = self.resolver.resolve(&request);
        let outgoing = self.attacher(namespace).attach(&request)?.into_owned();

        match self.dispatch(outgoing).await {
            Err(err) if err.is_auth_failure() && self.coordinator.is_eligible(namespace, &request) => {
                self.recover(request, err).await
            }
            result => self.escalator.observe(namespace, &request, result),
        }
    }

    async fn recover(
        &self,
        request: ApiRequest,
        original: ApiError,
    ) -> Result<ApiResponse, ApiError> {
        tracing::debug!(
            path = %request.route(),
            status = ?original.status(),
            "Auth failure, waiting for refreshed credential"
        );

        let Some(token) = self.coordinator.refreshed_credential().await else {
            // Session already logged out by the coordinator
            return Err(original);
        };

        let retried = request.with_bearer(&token)?;
        tracing::debug!(path = %request.route(), "Retrying with refreshed credential");
        let result = self.dispatch(retried).await;
        self.escalator.observe(Namespace::Tenant, &request, result)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(ApiRequest::get(path)).await?.json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::post(path).json(body)?).await?.json()
    }
}
