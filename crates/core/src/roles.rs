//! Caller roles and the resolver that derives them.
//!
//! A role is never stored; it is recomputed from the backend identity and
//! the local guest flag every time either changes.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Label shown for a guest-mode session.
pub const GUEST_LABEL: &str = "Guest";

/// Label shown when nobody is signed in.
pub const ANONYMOUS_LABEL: &str = "Anonymous";

/// Fallback label for an identity with neither display name nor email.
pub const FALLBACK_USER_LABEL: &str = "User";

/// Who is using the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The single identity allowed to mutate data.
    Owner,
    /// A non-owner identity, or a guest-mode session without one.
    AuthenticatedGuest,
    /// No identity and no guest flag.
    Anonymous,
}

impl Role {
    pub fn is_owner(self) -> bool {
        matches!(self, Self::Owner)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::AuthenticatedGuest => GUEST_LABEL,
            Self::Anonymous => ANONYMOUS_LABEL,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity record returned by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Identifies the application's single designated owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerPolicy {
    owner_email: Option<String>,
}

impl OwnerPolicy {
    /// A blank or missing email yields a policy that matches nobody.
    pub fn new(owner_email: Option<&str>) -> Self {
        Self {
            owner_email: owner_email
                .map(normalize_email)
                .filter(|email| !email.is_empty()),
        }
    }

    pub fn owner_email(&self) -> Option<&str> {
        self.owner_email.as_deref()
    }

    /// Whether `identity` is the configured owner. Emails compare
    /// case-insensitively after trimming.
    pub fn is_owner(&self, identity: &Identity) -> bool {
        match (&self.owner_email, identity.email.as_deref()) {
            (Some(owner), Some(email)) => *owner == normalize_email(email),
            _ => false,
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Derive the caller's role.
///
/// 1. guest flag and no identity → `AuthenticatedGuest`
/// 2. identity matching the owner → `Owner`
/// 3. any other identity → `AuthenticatedGuest`
/// 4. otherwise → `Anonymous`
pub fn resolve_role(identity: Option<&Identity>, guest_mode: bool, policy: &OwnerPolicy) -> Role {
    match identity {
        None if guest_mode => Role::AuthenticatedGuest,
        Some(identity) if policy.is_owner(identity) => Role::Owner,
        Some(_) => Role::AuthenticatedGuest,
        None => Role::Anonymous,
    }
}

/// Name shown in the header for the current session.
pub fn display_name(identity: Option<&Identity>, guest_mode: bool) -> String {
    match identity {
        None if guest_mode => GUEST_LABEL.to_string(),
        None => ANONYMOUS_LABEL.to_string(),
        Some(identity) => identity
            .display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(identity.email.as_deref())
            .unwrap_or(FALLBACK_USER_LABEL)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: &str) -> Identity {
        Identity {
            id: uuid::Uuid::new_v4(),
            email: Some(email.to_string()),
            display_name: None,
        }
    }

    fn policy() -> OwnerPolicy {
        OwnerPolicy::new(Some("owner@example.com"))
    }

    #[test]
    fn guest_flag_without_identity_is_guest() {
        assert_eq!(resolve_role(None, true, &policy()), Role::AuthenticatedGuest);
    }

    #[test]
    fn owner_email_resolves_to_owner() {
        let id = identity("owner@example.com");
        assert_eq!(resolve_role(Some(&id), false, &policy()), Role::Owner);
    }

    #[test]
    fn owner_match_ignores_case_and_whitespace() {
        let id = identity("  Owner@Example.COM ");
        assert_eq!(resolve_role(Some(&id), false, &policy()), Role::Owner);
    }

    #[test]
    fn identity_overrides_guest_flag() {
        let id = identity("owner@example.com");
        assert_eq!(resolve_role(Some(&id), true, &policy()), Role::Owner);
    }

    #[test]
    fn other_identity_is_guest() {
        let id = identity("visitor@example.com");
        assert_eq!(resolve_role(Some(&id), false, &policy()), Role::AuthenticatedGuest);
    }

    #[test]
    fn nothing_is_anonymous() {
        assert_eq!(resolve_role(None, false, &policy()), Role::Anonymous);
    }

    #[test]
    fn unconfigured_owner_matches_nobody() {
        let id = identity("owner@example.com");
        let empty = OwnerPolicy::new(Some("   "));
        assert_eq!(empty.owner_email(), None);
        assert_eq!(resolve_role(Some(&id), false, &empty), Role::AuthenticatedGuest);
        assert_eq!(
            resolve_role(Some(&id), false, &OwnerPolicy::default()),
            Role::AuthenticatedGuest
        );
    }

    #[test]
    fn identity_without_email_is_never_owner() {
        let id = Identity {
            id: uuid::Uuid::new_v4(),
            email: None,
            display_name: Some("owner@example.com".into()),
        };
        assert_eq!(resolve_role(Some(&id), false, &policy()), Role::AuthenticatedGuest);
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name(None, false), "Anonymous");
        assert_eq!(display_name(None, true), "Guest");

        let mut id = identity("me@example.com");
        assert_eq!(display_name(Some(&id), false), "me@example.com");
        id.display_name = Some("Me".into());
        assert_eq!(display_name(Some(&id), false), "Me");
        id.display_name = None;
        id.email = None;
        assert_eq!(display_name(Some(&id), false), "User");
    }

    #[test]
    fn role_labels() {
        assert_eq!(Role::AuthenticatedGuest.to_string(), "Guest");
        assert_eq!(Role::Owner.label(), "Owner");
        assert!(!Role::Anonymous.is_owner());
    }
}
