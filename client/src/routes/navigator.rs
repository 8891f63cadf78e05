use parking_lot::Mutex;

use crate::core::config::RoutesConfig;
use crate::session::Namespace;

/// Where the UI should go next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    TenantLogin,
    PlatformLogin,
    Path(String),
}

impl NavigationTarget {
    /// Login surface for a namespace
    pub fn login_for(namespace: Namespace) -> Self {
        match namespace {
            Namespace::Tenant => Self::TenantLogin,
            Namespace::Platform => Self::PlatformLogin,
        }
    }
}

/// Resolves navigation targets to concrete paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    tenant_login: String,
    platform_login: String,
}

impl Routes {
    pub fn new(config: &RoutesConfig) -> Self {
        Self {
            tenant_login: config.tenant_login.clone(),
            platform_login: config.platform_login.clone(),
        }
    }

    pub fn tenant_login(&self) -> &str {
        &self.tenant_login
    }

    pub fn platform_login(&self) -> &str {
        &self.platform_login
    }

    pub fn resolve(&self, target: &NavigationTarget) -> String {
        match target {
            NavigationTarget::TenantLogin => self.tenant_login.clone(),
            NavigationTarget::PlatformLogin => self.platform_login.clone(),
            NavigationTarget::Path(path) => path.clone(),
        }
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self::new(&RoutesConfig::default())
    }
}

/// Performs navigation on behalf of the session pipeline and guards
pub trait Navigator: Send + Sync + std::fmt::Debug {
    fn navigate(&self, target: NavigationTarget);
}

/// Navigator for headless use: logs the destination and remembers it
#[derive(Debug)]
pub struct LogNavigator {
    routes: Routes,
    last: Mutex<Option<String>>,
}

impl LogNavigator {
    pub fn new(routes: Routes) -> Self {
        Self {
            routes,
            last: Mutex::new(None),
        }
    }

    /// Path of the most recent navigation
    pub fn last(&self) -> Option<String> {
        self.last.lock().clone()
    }
}

impl Navigator for LogNavigator {
    fn navigate(&self, target: NavigationTarget) {
        let path = self.routes.resolve(&target);
        tracing::info!(path = %path, "Navigating");
        *self.last.lock() = Some(path);
    }
}

/// Navigator that records every target, in order
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<NavigationTarget> {
        self.visits.lock().clone()
    }

    pub fn count(&self, target: &NavigationTarget) -> usize {
        self.visits.lock().iter().filter(|t| *t == target).count()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: NavigationTarget) {
        self.visits.lock().push(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_resolve_targets() {
        let routes = Routes::new(&RoutesConfig {
            tenant_login: "/signin".to_string(),
            platform_login: "/ops/signin".to_string(),
        });

        assert_eq!(routes.resolve(&NavigationTarget::TenantLogin), "/signin");
        assert_eq!(
            routes.resolve(&NavigationTarget::login_for(Namespace::Platform)),
            "/ops/signin"
        );
        assert_eq!(
            routes.resolve(&NavigationTarget::Path("/invoices".to_string())),
            "/invoices"
        );
    }

    #[test]
    fn test_log_navigator_remembers_last() {
        let navigator = LogNavigator::new(Routes::default());
        assert!(navigator.last().is_none());

        navigator.navigate(NavigationTarget::PlatformLogin);
        assert_eq!(navigator.last().as_deref(), Some("/platform/login"));
    }
}
