//! In-process backend.
//!
//! Implements all three backend traits over shared in-memory state. The
//! row access rule matches the client visibility filter and permission
//! gate: private rows are readable, and any row is writable, only when the
//! caller is the configured owner and its id matches the row's `user_id`.
//! Used by the integration tests and for offline demos.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use folio_core::backend::{
    AuthEvent, Credentials, IdentityProvider, ImageUploader, ListingQuery, ProjectStore,
};
use folio_core::error::CoreError;
use folio_core::project::{Project, ProjectChanges};
use folio_core::roles::{Identity, OwnerPolicy};
use folio_core::types::{ProjectId, UserId};
use folio_core::upload::{validate_image, ImageFile};

/// Base URL of the fake image host.
pub const FAKE_IMAGE_HOST: &str = "https://images.folio.test";

/// Failure to inject into the next backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Unauthorized,
    NotFound,
}

impl FailureKind {
    fn into_error(self) -> CoreError {
        match self {
            Self::Network => CoreError::Network("connection reset by peer".into()),
            Self::Unauthorized => CoreError::Unauthorized("JWT expired".into()),
            Self::NotFound => CoreError::NotFound {
                entity: "project",
                id: "injected".into(),
            },
        }
    }
}

struct Account {
    password: String,
    identity: Identity,
}

#[derive(Default)]
struct State {
    /// Newest first.
    rows: Vec<Project>,
    accounts: HashMap<String, Account>,
    current: Option<Identity>,
    policy: OwnerPolicy,
    fail_next: Option<FailureKind>,
    magic_links: Vec<String>,
    uploads: usize,
    calls: usize,
}

impl State {
    /// Id of the caller when it is the owner. Everyone else gets `None`.
    fn owner_id(&self) -> Option<UserId> {
        self.current
            .as_ref()
            .filter(|i| self.policy.is_owner(i))
            .map(|i| i.id)
    }

    fn readable(&self, row: &Project) -> bool {
        !row.private || self.owner_id() == Some(row.user_id)
    }

    /// Count the call and hand out any injected failure.
    fn enter(&mut self) -> Result<(), CoreError> {
        self.calls += 1;
        match self.fail_next.take() {
            Some(kind) => Err(kind.into_error()),
            None => Ok(()),
        }
    }

    /// Index of a row the caller may write. Hidden rows look missing.
    fn writable_index(&self, id: ProjectId) -> Result<usize, CoreError> {
        let caller = self.owner_id();
        self.rows
            .iter()
            .position(|r| r.id == id && caller == Some(r.user_id))
            .ok_or_else(|| CoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            })
    }
}

fn apply_changes(row: &mut Project, changes: &ProjectChanges) {
    row.title = changes.title.clone();
    row.description = changes.description.clone();
    row.link = changes.link.clone();
    row.github = changes.github.clone();
    row.preview_image_url = changes.preview_image_url.clone();
    row.status = changes.status;
    row.category = changes.category;
    row.year = changes.year;
    row.featured = changes.featured;
    row.private = changes.private;
}

pub struct InMemoryBackend {
    state: Mutex<State>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Backend where nobody is the owner until
    /// [`with_owner_policy`](Self::with_owner_policy) is applied.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(State::default()),
            events,
        }
    }

    /// Use the same owner policy as the client session.
    pub fn with_owner_policy(mut self, policy: OwnerPolicy) -> Self {
        if let Ok(state) = self.state.get_mut() {
            state.policy = policy;
        }
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Internal("in-memory backend lock poisoned".into()))
    }

    /// Register an account; returns its identity.
    pub fn with_account(&self, email: &str, password: &str) -> Result<Identity, CoreError> {
        let identity = Identity {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            display_name: None,
        };
        self.lock()?.accounts.insert(
            email.trim().to_lowercase(),
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        Ok(identity)
    }

    /// Insert a row as-is, newest first.
    pub fn seed(&self, project: Project) -> Result<(), CoreError> {
        self.lock()?.rows.insert(0, project);
        Ok(())
    }

    /// Every stored row regardless of access rules.
    pub fn rows(&self) -> Result<Vec<Project>, CoreError> {
        Ok(self.lock()?.rows.clone())
    }

    pub fn fail_next(&self, kind: FailureKind) -> Result<(), CoreError> {
        self.lock()?.fail_next = Some(kind);
        Ok(())
    }

    /// Number of backend calls served so far.
    pub fn calls(&self) -> Result<usize, CoreError> {
        Ok(self.lock()?.calls)
    }

    /// Addresses magic links were sent to.
    pub fn magic_links(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.lock()?.magic_links.clone())
    }

    fn announce(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl ProjectStore for InMemoryBackend {
    async fn list(&self, query: ListingQuery) -> Result<Vec<Project>, CoreError> {
        let mut state = self.lock()?;
        state.enter()?;
        let rows = state
            .rows
            .iter()
            .filter(|r| state.readable(r))
            .filter(|r| query.scope.includes(r))
            .filter(|r| !query.featured_only || r.featured)
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn get(&self, id: ProjectId) -> Result<Project, CoreError> {
        let mut state = self.lock()?;
        state.enter()?;
        state
            .rows
            .iter()
            .find(|r| r.id == id && state.readable(r))
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            })
    }

    async fn create(&self, owner: UserId, changes: &ProjectChanges) -> Result<Project, CoreError> {
        let mut state = self.lock()?;
        state.enter()?;
        if state.owner_id() != Some(owner) {
            return Err(CoreError::Unauthorized(
                "new row violates row-level security policy for table \"projects\"".into(),
            ));
        }

        let mut row = Project {
            id: Uuid::new_v4(),
            title: String::new(),
            description: None,
            link: None,
            github: None,
            preview_image_url: None,
            status: Default::default(),
            category: None,
            year: changes.year,
            featured: false,
            private: false,
            user_id: owner,
            created_at: Utc::now(),
            updated_at: None,
        };
        apply_changes(&mut row, changes);
        state.rows.insert(0, row.clone());
        Ok(row)
    }

    async fn update(&self, id: ProjectId, changes: &ProjectChanges) -> Result<Project, CoreError> {
        let mut state = self.lock()?;
        state.enter()?;
        let index = state.writable_index(id)?;
        let row = &mut state.rows[index];
        apply_changes(row, changes);
        row.updated_at = Some(Utc::now());
        Ok(row.clone())
    }

    async fn delete(&self, id: ProjectId) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        state.enter()?;
        let index = state.writable_index(id)?;
        state.rows.remove(index);
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryBackend {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, CoreError> {
        let identity = {
            let mut state = self.lock()?;
            state.enter()?;
            let identity = state
                .accounts
                .get(&credentials.email.trim().to_lowercase())
                .filter(|a| a.password == credentials.password)
                .map(|a| a.identity.clone())
                .ok_or_else(|| CoreError::Unauthorized("Invalid login credentials".into()))?;
            state.current = Some(identity.clone());
            identity
        };
        self.announce(AuthEvent::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Identity>, CoreError> {
        let key = credentials.email.trim().to_lowercase();
        let identity = {
            let mut state = self.lock()?;
            state.enter()?;
            if state.accounts.contains_key(&key) {
                return Err(CoreError::Unauthorized("User already registered".into()));
            }
            let identity = Identity {
                id: Uuid::new_v4(),
                email: Some(credentials.email.trim().to_string()),
                display_name: None,
            };
            state.accounts.insert(
                key,
                Account {
                    password: credentials.password.clone(),
                    identity: identity.clone(),
                },
            );
            state.current = Some(identity.clone());
            identity
        };
        self.announce(AuthEvent::SignedIn(identity.clone()));
        Ok(Some(identity))
    }

    async fn send_magic_link(&self, email: &str) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        state.enter()?;
        state.magic_links.push(email.to_string());
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), CoreError> {
        {
            let mut state = self.lock()?;
            state.enter()?;
            state.current = None;
        }
        self.announce(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<Identity>, CoreError> {
        let mut state = self.lock()?;
        state.enter()?;
        Ok(state.current.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl ImageUploader for InMemoryBackend {
    async fn upload(&self, image: &ImageFile) -> Result<String, CoreError> {
        let mut state = self.lock()?;
        state.enter()?;
        if state.current.is_none() {
            return Err(CoreError::Unauthorized(
                "User must be authenticated to upload images".into(),
            ));
        }
        validate_image(&image.content_type, image.size())?;
        state.uploads += 1;
        Ok(format!("{FAKE_IMAGE_HOST}/{}/{}", state.uploads, image.file_name))
    }
}
