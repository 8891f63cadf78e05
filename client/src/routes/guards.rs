//! Route guards
//!
//! Pure predicates over a session snapshot. No I/O; the caller passes the
//! snapshot in and acts on the returned decision.

use crate::session::{Role, Session};

use super::navigator::{NavigationTarget, Navigator, Routes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectTo(String),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    /// Perform the redirect, if any, through `navigator`. Returns whether entry is allowed.
    pub fn apply(self, navigator: &dyn Navigator) -> bool {
        match self {
            GuardDecision::Allow => true,
            GuardDecision::RedirectTo(path) => {
                navigator.navigate(NavigationTarget::Path(path));
                false
            }
        }
    }
}

/// Top-level tenant area: owner only
pub fn tenant_guard(session: &Session, routes: &Routes) -> GuardDecision {
    if session.is_authenticated() && session.role() == Some(Role::Owner) {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectTo(routes.tenant_login().to_string())
    }
}

/// Administration area: owner or admin
pub fn admin_guard(session: &Session, routes: &Routes) -> GuardDecision {
    match session.role() {
        Some(Role::Owner | Role::Admin) if session.is_authenticated() => GuardDecision::Allow,
        _ => GuardDecision::RedirectTo(routes.tenant_login().to_string()),
    }
}

/// Platform-admin area: needs a platform credential (no role check)
pub fn platform_guard(platform: &Session, routes: &Routes) -> GuardDecision {
    if platform.has_credential() {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectTo(routes.platform_login().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RecordingNavigator;
    use crate::session::Principal;

    fn session(credential: Option<&str>, role: Option<Role>) -> Session {
        Session {
            credential: credential.map(str::to_string),
            identity: Some(Principal::new("u1", role)),
        }
    }

    #[test]
    fn test_tenant_guard_owner_only() {
        let routes = Routes::default();

        assert!(tenant_guard(&session(Some("t"), Some(Role::Owner)), &routes).is_allowed());
        assert_eq!(
            tenant_guard(&session(Some("t"), Some(Role::Admin)), &routes),
            GuardDecision::RedirectTo("/login".to_string())
        );
        assert!(!tenant_guard(&session(None, Some(Role::Owner)), &routes).is_allowed());
    }

    #[test]
    fn test_credential_without_role_is_denied() {
        let routes = Routes::default();
        let s = session(Some("t"), None);

        assert!(!tenant_guard(&s, &routes).is_allowed());
        assert!(!admin_guard(&s, &routes).is_allowed());
    }

    #[test]
    fn test_admin_guard_owner_or_admin() {
        let routes = Routes::default();

        assert!(admin_guard(&session(Some("t"), Some(Role::Owner)), &routes).is_allowed());
        assert!(admin_guard(&session(Some("t"), Some(Role::Admin)), &routes).is_allowed());
        assert!(!admin_guard(&session(Some("t"), Some(Role::User)), &routes).is_allowed());
    }

    #[test]
    fn test_platform_guard_redirects_to_platform_login() {
        let routes = Routes::default();
        let navigator = RecordingNavigator::new();

        let decision = platform_guard(&Session::default(), &routes);
        assert!(!decision.apply(&navigator));
        assert_eq!(
            navigator.visits(),
            vec![NavigationTarget::Path("/platform/login".to_string())]
        );

        let signed_in = Session {
            credential: Some("p1".to_string()),
            identity: None,
        };
        assert!(platform_guard(&signed_in, &routes).apply(&navigator));
        assert_eq!(navigator.visits().len(), 1);
    }
}
