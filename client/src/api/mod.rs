//! Remote API access

pub mod auth;
mod error;
mod transport;
mod types;

pub use auth::{AuthApi, AuthClient, Credentials, RegisterRequest, TokenRefresher};
pub use error::ApiError;
pub use transport::{ReqwestTransport, Transport};
pub use types::{ApiRequest, ApiResponse};
