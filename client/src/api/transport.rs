//! Request carriers

use std::time::Duration;

use async_trait::async_trait;

use crate::core::config::ApiConfig;

use super::error::ApiError;
use super::types::{ApiRequest, ApiResponse};

/// Carries a request to the backend and returns whatever came back.
///
/// Any HTTP status is a successful send; only failures to get a response at
/// all are errors.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// HTTP transport over `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("billdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.path);
        tracing::trace!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        tracing::trace!(url = %url, status = status.as_u16(), "Response received");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn transport_for(server: &MockServer) -> ReqwestTransport {
        ReqwestTransport::new(&ApiConfig {
            base_url: server.url("/api/"),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_returns_non_success_status_as_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/invoices")
                    .header("authorization", "Bearer t1");
                then.status(401).body("expired");
            })
            .await;

        let transport = transport_for(&server);
        let request = ApiRequest::get("/invoices").with_bearer("t1").unwrap();
        let response = transport.send(request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status.as_u16(), 401);
        assert_eq!(response.text(), "expired");
    }

    #[tokio::test]
    async fn test_send_json_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/clients")
                    .json_body(serde_json::json!({ "name": "Acme" }));
                then.status(201).json_body(serde_json::json!({ "id": "c1" }));
            })
            .await;

        let transport = transport_for(&server);
        let request = ApiRequest::post("clients")
            .json(&serde_json::json!({ "name": "Acme" }))
            .unwrap();
        let response = transport.send(request).await.unwrap();

        mock.assert_async().await;
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["id"], "c1");
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let transport = ReqwestTransport::new(&ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            ..Default::default()
        })
        .unwrap();

        let result = transport.send(ApiRequest::get("/health")).await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
