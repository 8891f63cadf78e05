//! Session pipeline: credential attachment, single-flight refresh, forced logout

mod attacher;
mod client;
mod endpoints;
mod escalator;
mod refresh;

pub use attacher::{CredentialAttacher, NamespaceResolver};
pub use client::AuthClient;
pub use endpoints::{AuthApi, Credentials, RegisterRequest};
pub use escalator::FailureEscalator;
pub use refresh::{HttpRefresher, RefreshCoordinator, RefreshExemptions, TokenRefresher};
