//! Visibility filter for project listings.
//!
//! Public records are visible to every role; private records only to the
//! owner. The hosted datastore enforces the same rule through its row
//! policy; this module is the client-side mirror and must agree with it.

use serde::{Deserialize, Serialize};

use crate::project::Project;
use crate::roles::Role;

/// Whether `role` may list or open `project`.
pub fn is_visible(project: &Project, role: Role) -> bool {
    !project.private || role.is_owner()
}

/// Drop every record `role` may not see, preserving order.
pub fn filter_visible(mut projects: Vec<Project>, role: Role) -> Vec<Project> {
    projects.retain(|p| is_visible(p, role));
    projects
}

/// Which slice of the catalog a listing asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingScope {
    /// Only `private = false` records.
    #[default]
    Public,
    /// Only `private = true` records. Owner only.
    Private,
    /// Everything the caller may see.
    All,
}

impl ListingScope {
    /// The listing a role gets when no scope is requested explicitly.
    pub fn for_role(role: Role) -> Self {
        if role.is_owner() {
            Self::All
        } else {
            Self::Public
        }
    }

    /// Whether a record belongs to this scope, ignoring who asks.
    pub fn includes(self, project: &Project) -> bool {
        match self {
            Self::Public => !project.private,
            Self::Private => project.private,
            Self::All => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::All => "all",
        }
    }
}
