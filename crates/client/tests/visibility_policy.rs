//! No private record reaches a non-owner, whichever layer is asked.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;

use common::{policy_fixtures, visitor_credentials, Harness};
use folio_client::error::ClientError;
use folio_client::guest::MemoryGuestFlag;
use folio_client::orchestrator::ProjectOrchestrator;
use folio_core::backend::{IdentityProvider, ListingQuery, ProjectStore};
use folio_core::error::CoreError;
use folio_core::project::{Project, ProjectChanges};
use folio_core::roles::Role;
use folio_core::types::{ProjectId, UserId};
use folio_core::visibility::{filter_visible, ListingScope};

/// Store that ignores every filter and returns all rows.
struct LeakyStore(Vec<Project>);

#[async_trait]
impl ProjectStore for LeakyStore {
    async fn list(&self, _query: ListingQuery) -> Result<Vec<Project>, CoreError> {
        Ok(self.0.clone())
    }

    async fn get(&self, id: ProjectId) -> Result<Project, CoreError> {
        self.0
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            })
    }

    async fn create(&self, _owner: UserId, _changes: &ProjectChanges) -> Result<Project, CoreError> {
        Err(CoreError::Internal("read-only".into()))
    }

    async fn update(&self, _id: ProjectId, _changes: &ProjectChanges) -> Result<Project, CoreError> {
        Err(CoreError::Internal("read-only".into()))
    }

    async fn delete(&self, _id: ProjectId) -> Result<(), CoreError> {
        Err(CoreError::Internal("read-only".into()))
    }
}

fn assert_no_private(projects: &[Project]) {
    let leaked: Vec<&str> = projects
        .iter()
        .filter(|p| p.private)
        .map(|p| p.title.as_str())
        .collect();
    assert!(leaked.is_empty(), "private projects leaked: {leaked:?}");
}

#[tokio::test]
async fn anonymous_listing_has_no_private_rows() {
    let harness = Harness::seeded();
    let mut app = harness.orchestrator().await;
    assert_eq!(app.role(), Role::Anonymous);

    app.load().await.unwrap();
    assert_eq!(app.projects().len(), 2);
    assert_no_private(app.projects());
}

#[tokio::test]
async fn guest_mode_listing_has_no_private_rows() {
    let harness = Harness::seeded();
    let mut app = harness.orchestrator().await;
    app.enter_guest().await.unwrap();
    assert_eq!(app.role(), Role::AuthenticatedGuest);

    app.set_featured_only(true);
    app.load().await.unwrap();
    assert_no_private(app.projects());
    assert_eq!(app.projects().len(), 1);
}

#[tokio::test]
async fn signed_in_visitor_never_sees_private_rows_even_their_own() {
    let harness = Harness::seeded();
    let mut app = harness.orchestrator().await;
    let role = app.sign_in(&visitor_credentials()).await.unwrap();
    assert_eq!(role, Role::AuthenticatedGuest);
    assert_no_private(app.projects());
}

#[tokio::test]
async fn non_owner_cannot_request_private_scope() {
    let harness = Harness::seeded();
    let mut app = harness.orchestrator().await;
    app.sign_in(&visitor_credentials()).await.unwrap();
    let before = app.projects().to_vec();

    for scope in [ListingScope::Private, ListingScope::All] {
        app.set_scope(Some(scope));
        let err = app.load().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(app.last_error().is_some());
        assert_eq!(app.projects(), before.as_slice());
    }
}

#[tokio::test]
async fn backend_hides_private_rows_from_non_owners_in_every_scope() {
    let harness = Harness::seeded();
    let scopes = [ListingScope::Public, ListingScope::Private, ListingScope::All];

    for scope in scopes {
        let rows = harness.backend.list(ListingQuery::scope(scope)).await.unwrap();
        assert_no_private(&rows);
    }

    // A signed-in non-owner does not get private rows either, even its own.
    harness.backend.sign_in(&visitor_credentials()).await.unwrap();
    for scope in scopes {
        let rows = harness.backend.list(ListingQuery::scope(scope)).await.unwrap();
        assert_no_private(&rows);
    }
    let own_private = harness
        .backend
        .rows()
        .unwrap()
        .into_iter()
        .find(|p| p.user_id == harness.visitor.id)
        .unwrap();
    assert_matches!(
        harness.backend.get(own_private.id).await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn client_filter_drops_rows_a_leaky_backend_returns() {
    let harness = Harness::new();
    let rows = policy_fixtures(harness.owner.id, harness.visitor.id);
    let store = Arc::new(LeakyStore(rows.clone()));

    let session = harness.session(Arc::new(MemoryGuestFlag::new())).await;
    let mut app = ProjectOrchestrator::new(session, store, harness.backend.clone());
    app.load().await.unwrap();
    assert_no_private(app.projects());
    assert_eq!(app.visible_projects().len(), 2);

    for role in [Role::AuthenticatedGuest, Role::Anonymous] {
        assert_no_private(&filter_visible(rows.clone(), role));
    }
}

#[tokio::test]
async fn owner_sees_own_private_rows() {
    let harness = Harness::seeded();
    let app = harness.owner_orchestrator().await;
    assert_eq!(app.role(), Role::Owner);

    let titles: Vec<&str> = app.projects().iter().map(|p| p.title.as_str()).collect();
    assert!(titles.contains(&"Secret Lab"));
    // Another account's private row stays hidden by the row policy.
    assert!(!titles.contains(&"Visitor Notes"));
}

#[tokio::test]
async fn owner_private_scope_lists_only_private_rows() {
    let harness = Harness::seeded();
    let mut app = harness.owner_orchestrator().await;
    app.set_scope(Some(ListingScope::Private));
    app.load().await.unwrap();
    assert_eq!(app.projects().len(), 1);
    assert!(app.projects()[0].private);
}

#[tokio::test]
async fn failed_listing_keeps_previous_collection() {
    let harness = Harness::seeded();
    let mut app = harness.orchestrator().await;
    app.load().await.unwrap();
    let before = app.projects().to_vec();

    harness
        .backend
        .fail_next(folio_client::memory::FailureKind::Network)
        .unwrap();
    let err = app.load().await.unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::Network(_)));
    assert_eq!(app.projects(), before.as_slice());
    assert_eq!(app.last_error(), Some("Could not reach the server. Please try again."));
    assert!(!app.is_busy());
}
