//! Collaborator traits for the hosted backend.
//!
//! The datastore, identity provider and image upload endpoint are external
//! services. The client talks to them only through these traits so the
//! orchestrator can run against the HTTP adapters or an in-process double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::CoreError;
use crate::project::{Project, ProjectChanges};
use crate::roles::Identity;
use crate::types::{ProjectId, UserId};
use crate::upload::ImageFile;
use crate::visibility::ListingScope;

/// Filters a listing request forwards to the datastore. Results are
/// always ordered by creation time, newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    pub scope: ListingScope,
    pub featured_only: bool,
}

impl ListingQuery {
    pub fn scope(scope: ListingScope) -> Self {
        Self {
            scope,
            featured_only: false,
        }
    }

    pub fn featured(mut self) -> Self {
        self.featured_only = true;
        self
    }
}

/// CRUD over the `projects` collection.
///
/// Implementations must enforce the hosted access rule themselves: private
/// rows are only returned to, and only writable by, their owner.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list(&self, query: ListingQuery) -> Result<Vec<Project>, CoreError>;

    async fn get(&self, id: ProjectId) -> Result<Project, CoreError>;

    async fn create(&self, owner: UserId, changes: &ProjectChanges) -> Result<Project, CoreError>;

    async fn update(&self, id: ProjectId, changes: &ProjectChanges) -> Result<Project, CoreError>;

    async fn delete(&self, id: ProjectId) -> Result<(), CoreError>;
}

/// Identity change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Identity),
    SignedOut,
}

/// Email/password credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Authentication provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, CoreError>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Identity>, CoreError>;

    /// Send a passwordless sign-in link. The identity changes only once the
    /// link is followed.
    async fn send_magic_link(&self, email: &str) -> Result<(), CoreError>;

    async fn sign_out(&self) -> Result<(), CoreError>;

    /// `Ok(None)` when nobody is signed in.
    async fn current_identity(&self) -> Result<Option<Identity>, CoreError>;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Upload endpoint returning a durable public URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, image: &ImageFile) -> Result<String, CoreError>;
}
