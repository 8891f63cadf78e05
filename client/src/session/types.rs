//! Session value types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Independent authentication context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Primary tenant workspace
    Tenant,
    /// Platform-admin area
    Platform,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Tenant => write!(f, "tenant"),
            Namespace::Platform => write!(f, "platform"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Billing subscription attached to a tenant principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_deref(), Some("active") | Some("trialing"))
    }
}

/// Authenticated tenant identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// A role the client does not recognise deserializes as `None`
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
            role,
            subscription: None,
        }
    }
}

/// Snapshot of one namespace's session
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub credential: Option<String>,
    /// Tenant namespace only
    pub identity: Option<Principal>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("identity", &self.identity)
            .finish()
    }
}

impl Session {
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().and_then(|p| p.role)
    }

    /// Credential plus a role. Authorization decisions in the tenant area
    /// require both; a credential without a role never counts.
    pub fn is_authenticated(&self) -> bool {
        self.has_credential() && self.role().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_tolerates_unknown_fields_and_roles() {
        let principal: Principal = serde_json::from_str(
            r#"{ "id": "u1", "role": "superuser", "tenantId": "t9", "subscription": { "plan": "pro", "status": "trialing" } }"#,
        )
        .unwrap();

        assert_eq!(principal.id, "u1");
        assert_eq!(principal.role, None);
        assert!(principal.subscription.unwrap().is_active());
    }

    #[test]
    fn test_session_requires_role_for_authentication() {
        let mut session = Session {
            credential: Some("t1".to_string()),
            identity: Some(Principal::new("u1", None)),
        };
        assert!(session.has_credential());
        assert!(!session.is_authenticated());

        session.identity = Some(Principal::new("u1", Some(Role::User)));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_session_debug_redacts_credential() {
        let session = Session {
            credential: Some("super-secret".to_string()),
            identity: None,
        };
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_cancelled_subscription_inactive() {
        let sub = Subscription {
            plan: Some("basic".to_string()),
            status: Some("canceled".to_string()),
            current_period_end: None,
        };
        assert!(!sub.is_active());
    }
}
