use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the API client.
///
/// Auth failures reach callers as the original `Status` error; the session
/// pipeline never replaces them with an error of its own.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Credential is not a valid header value")]
    InvalidCredential,
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401 or 403
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_server_error())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: StatusCode) -> ApiError {
        ApiError::Status {
            status: code,
            body: String::new(),
        }
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(status(StatusCode::UNAUTHORIZED).is_auth_failure());
        assert!(status(StatusCode::FORBIDDEN).is_auth_failure());
        assert!(!status(StatusCode::NOT_FOUND).is_auth_failure());
        assert!(!ApiError::Transport("reset".to_string()).is_auth_failure());
    }

    #[test]
    fn test_server_error_classification() {
        assert!(status(StatusCode::BAD_GATEWAY).is_server_error());
        assert!(!status(StatusCode::UNAUTHORIZED).is_server_error());
    }
}
