#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use folio_client::guest::{GuestFlagStore, MemoryGuestFlag};
use folio_client::memory::InMemoryBackend;
use folio_client::orchestrator::ProjectOrchestrator;
use folio_client::session::Session;
use folio_core::backend::Credentials;
use folio_core::project::{Project, ProjectCategory, ProjectStatus};
use folio_core::roles::{Identity, OwnerPolicy};
use folio_core::types::UserId;

pub const YEAR: i32 = 2025;

pub const OWNER_EMAIL: &str = "owner@folio.test";
pub const OWNER_PASSWORD: &str = "owner-pass";
pub const VISITOR_EMAIL: &str = "visitor@folio.test";
pub const VISITOR_PASSWORD: &str = "visitor-pass";

/// In-memory backend with an owner and a visitor account.
pub struct Harness {
    pub backend: Arc<InMemoryBackend>,
    pub owner: Identity,
    pub visitor: Identity,
}

impl Harness {
    pub fn new() -> Self {
        let backend = Arc::new(
            InMemoryBackend::new().with_owner_policy(OwnerPolicy::new(Some(OWNER_EMAIL))),
        );
        let owner = backend.with_account(OWNER_EMAIL, OWNER_PASSWORD).unwrap();
        let visitor = backend.with_account(VISITOR_EMAIL, VISITOR_PASSWORD).unwrap();
        Self {
            backend,
            owner,
            visitor,
        }
    }

    /// Harness seeded with [`policy_fixtures`].
    pub fn seeded() -> Self {
        let harness = Self::new();
        for project in policy_fixtures(harness.owner.id, harness.visitor.id) {
            harness.backend.seed(project).unwrap();
        }
        harness
    }

    pub fn policy(&self) -> OwnerPolicy {
        OwnerPolicy::new(Some(OWNER_EMAIL))
    }

    pub async fn session(&self, guest_store: Arc<dyn GuestFlagStore>) -> Session {
        Session::start(self.backend.clone(), guest_store, self.policy())
            .await
            .unwrap()
    }

    pub async fn orchestrator_with(&self, guest_store: Arc<dyn GuestFlagStore>) -> ProjectOrchestrator {
        let session = self.session(guest_store).await;
        ProjectOrchestrator::new(session, self.backend.clone(), self.backend.clone()).with_current_year(YEAR)
    }

    pub async fn orchestrator(&self) -> ProjectOrchestrator {
        self.orchestrator_with(Arc::new(MemoryGuestFlag::new())).await
    }

    /// Orchestrator signed in as the owner with the collection loaded.
    pub async fn owner_orchestrator(&self) -> ProjectOrchestrator {
        let mut app = self.orchestrator().await;
        app.sign_in(&owner_credentials()).await.unwrap();
        app
    }
}

pub fn owner_credentials() -> Credentials {
    Credentials {
        email: OWNER_EMAIL.into(),
        password: OWNER_PASSWORD.into(),
    }
}

pub fn visitor_credentials() -> Credentials {
    Credentials {
        email: VISITOR_EMAIL.into(),
        password: VISITOR_PASSWORD.into(),
    }
}

pub fn project(title: &str, year: i32, private: bool, user_id: UserId) -> Project {
    Project {
        id: Uuid::new_v4(),
        title: title.into(),
        description: Some(format!("About {title}")),
        link: None,
        github: None,
        preview_image_url: None,
        status: ProjectStatus::Completed,
        category: Some(ProjectCategory::Productivity),
        year,
        featured: false,
        private,
        user_id,
        created_at: Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
        updated_at: None,
    }
}

/// Rows shared by every access-policy test: a mix of public and private
/// records from the owner plus a private record from another account.
pub fn policy_fixtures(owner: UserId, other: UserId) -> Vec<Project> {
    let mut featured = project("Portfolio Site", 2023, false, owner);
    featured.featured = true;
    vec![
        project("Budget Tracker", 2021, false, owner),
        project("Secret Lab", 2019, true, owner),
        featured,
        project("Visitor Notes", 2022, true, other),
    ]
}
