//! Terminal failure handling: forced logout and observability

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::types::{ApiRequest, ApiResponse};
use crate::routes::{NavigationTarget, Navigator};
use crate::session::{Namespace, Sessions};

/// Observes final results and logs sessions out on terminal auth failures.
///
/// Always hands the original result back; it never swallows or replaces errors.
#[derive(Debug, Clone)]
pub struct FailureEscalator {
    sessions: Sessions,
    navigator: Arc<dyn Navigator>,
}

impl FailureEscalator {
    pub fn new(sessions: Sessions, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            sessions,
            navigator,
        }
    }

    pub fn observe(
        &self,
        namespace: Namespace,
        request: &ApiRequest,
        result: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError> {
        if let Err(err) = &result {
            if err.is_auth_failure() {
                tracing::warn!(
                    namespace = %namespace,
                    path = %request.route(),
                    status = ?err.status(),
                    "Authentication failed"
                );
                self.force_logout(namespace);
            } else if err.is_server_error() {
                tracing::error!(
                    method = %request.method,
                    path = %request.route(),
                    error = %err,
                    "Server error"
                );
            }
        }
        result
    }

    /// Clear the namespace's session and navigate to its login surface
    pub fn force_logout(&self, namespace: Namespace) {
        tracing::warn!(namespace = %namespace, "Forcing logout");
        self.sessions.store(namespace).logout();
        self.navigator
            .navigate(NavigationTarget::login_for(namespace));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::session::MemoryBackend;
    use crate::routes::RecordingNavigator;
    use reqwest::StatusCode;

    fn setup() -> (Sessions, Arc<RecordingNavigator>, FailureEscalator) {
        let sessions = Sessions::open(Arc::new(MemoryBackend::new()));
        sessions.tenant.login("t1", None);
        sessions.platform.login("p1", None);
        let navigator = Arc::new(RecordingNavigator::new());
        let escalator = FailureEscalator::new(sessions.clone(), navigator.clone());
        (sessions, navigator, escalator)
    }

    fn failure(status: StatusCode) -> Result<ApiResponse, ApiError> {
        Err(ApiError::Status {
            status,
            body: "denied".to_string(),
        })
    }

    #[test]
    fn test_forbidden_logs_out_and_reraises() {
        let (sessions, navigator, escalator) = setup();
        let request = ApiRequest::get("/platform/tenants");

        let result = escalator.observe(Namespace::Platform, &request, failure(StatusCode::FORBIDDEN));

        assert_eq!(result.unwrap_err().status(), Some(StatusCode::FORBIDDEN));
        assert!(sessions.platform.credential().is_none());
        assert_eq!(sessions.tenant.credential().as_deref(), Some("t1"));
        assert_eq!(navigator.visits(), vec![NavigationTarget::PlatformLogin]);
    }

    #[test]
    fn test_server_error_has_no_state_effect() {
        let (sessions, navigator, escalator) = setup();
        let request = ApiRequest::get("/invoices");

        let result = escalator.observe(
            Namespace::Tenant,
            &request,
            failure(StatusCode::INTERNAL_SERVER_ERROR),
        );

        assert!(result.unwrap_err().is_server_error());
        assert_eq!(sessions.tenant.credential().as_deref(), Some("t1"));
        assert!(navigator.visits().is_empty());
    }

    #[test]
    fn test_success_and_transport_errors_pass_through() {
        let (sessions, navigator, escalator) = setup();
        let request = ApiRequest::get("/invoices");

        let ok = escalator.observe(
            Namespace::Tenant,
            &request,
            Ok(ApiResponse::new(StatusCode::OK, "[]")),
        );
        assert!(ok.is_ok());

        let err = escalator.observe(
            Namespace::Tenant,
            &request,
            Err(ApiError::Transport("connection reset".to_string())),
        );
        assert!(matches!(err, Err(ApiError::Transport(_))));

        assert!(sessions.tenant.credential().is_some());
        assert!(navigator.visits().is_empty());
    }
}
