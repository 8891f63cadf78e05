//! Sign-in, registration and sign-out

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::core::config::AuthEndpoints;
use crate::session::{Namespace, Principal};

use super::client::AuthClient;

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("company", &self.company)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    token: String,
    user: Principal,
}

#[derive(Debug, Deserialize)]
struct PlatformSessionResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    token: String,
}

/// Authentication bootstrap calls. All of them are exempt from token refresh.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: Arc<AuthClient>,
    endpoints: AuthEndpoints,
}

impl AuthApi {
    pub fn new(client: Arc<AuthClient>, endpoints: AuthEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// Sign in to the tenant workspace and store the session
    pub async fn login(&self, credentials: &Credentials) -> Result<Principal, ApiError> {
        let response: SessionResponse = self
            .client
            .post_json(&self.endpoints.login, credentials)
            .await?;
        self.store_tenant(response)
    }

    /// Create a tenant account; the backend signs the new owner in
    pub async fn register(&self, request: &RegisterRequest) -> Result<Principal, ApiError> {
        let response: SessionResponse = self
            .client
            .post_json(&self.endpoints.register, request)
            .await?;
        self.store_tenant(response)
    }

    /// Sign in to the platform-admin area
    pub async fn platform_login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let response: PlatformSessionResponse = self
            .client
            .post_json(&self.endpoints.platform_login, credentials)
            .await?;
        if response.token.trim().is_empty() {
            return Err(ApiError::Decode("login response has an empty token".to_string()));
        }
        self.client.sessions().platform.login(response.token, None);
        Ok(())
    }

    /// Local sign-out; the backend keeps no session to tear down
    pub fn logout(&self, namespace: Namespace) {
        self.client.sessions().store(namespace).logout();
    }

    fn store_tenant(&self, response: SessionResponse) -> Result<Principal, ApiError> {
        if response.token.trim().is_empty() {
            return Err(ApiError::Decode("login response has an empty token".to_string()));
        }
        if response.user.role.is_none() {
            tracing::warn!(user = %response.user.id, "Signed-in user has no recognised role");
        }
        self.client
            .sessions()
            .tenant
            .login(response.token, Some(response.user.clone()));
        Ok(response.user)
    }
}
