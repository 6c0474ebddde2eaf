//! Permission gate for mutating actions.
//!
//! Every gated action requires [`Role::Owner`]. Guests and anonymous
//! callers share the same read-only permissions.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;

/// An action that must pass the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Create,
    Edit,
    Delete,
    UploadImage,
    ViewPrivateListing,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Self::Create,
        Self::Edit,
        Self::Delete,
        Self::UploadImage,
        Self::ViewPrivateListing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::UploadImage => "uploadImage",
            Self::ViewPrivateListing => "viewPrivateListing",
        }
    }

    /// Whether the action writes to the datastore or upload endpoint.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::ViewPrivateListing)
    }
}

/// Whether `role` may perform `action`.
pub fn is_permitted(role: Role, action: Action) -> bool {
    match action {
        Action::Create
        | Action::Edit
        | Action::Delete
        | Action::UploadImage
        | Action::ViewPrivateListing => role.is_owner(),
    }
}

/// Enforced form of [`is_permitted`], used immediately before dispatch.
///
/// Fails closed with [`CoreError::Unauthorized`].
pub fn authorize(role: Role, action: Action) -> Result<(), CoreError> {
    if is_permitted(role, action) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(format!(
            "Owner role required for '{}' (current role: {role})",
            action.name()
        )))
    }
}
