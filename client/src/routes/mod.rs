//! Navigation targets and route guards

mod guards;
mod navigator;

pub use guards::{GuardDecision, admin_guard, platform_guard, tenant_guard};
pub use navigator::{LogNavigator, NavigationTarget, Navigator, RecordingNavigator, Routes};
