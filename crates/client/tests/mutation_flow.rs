//! Permission-gated create, edit and delete through the orchestrator.

mod common;

use assert_matches::assert_matches;

use common::{visitor_credentials, Harness, YEAR};
use folio_client::error::ClientError;
use folio_client::form::{ModalMode, ProjectForm};
use folio_client::memory::FailureKind;
use folio_client::orchestrator::{OperationState, SubmitOutcome};
use folio_core::error::CoreError;
use folio_core::project::{ProjectCategory, ProjectField, ProjectStatus};
use folio_core::roles::Role;
use folio_core::validation::rules::MSG_TITLE_REQUIRED;

fn filled_form() -> ProjectForm {
    let mut form = ProjectForm::add(YEAR);
    form.set_text(ProjectField::Title, "Habit Coach").unwrap();
    form.set_text(ProjectField::Link, "https://habit.example.com").unwrap();
    form.set_status(ProjectStatus::InProgress);
    form.set_category(Some(ProjectCategory::Productivity));
    form
}

#[tokio::test]
async fn non_owners_are_denied_every_mutation_without_backend_calls() {
    let harness = Harness::seeded();
    let mut anonymous = harness.orchestrator().await;
    anonymous.load().await.unwrap();

    let mut visitor = harness.orchestrator().await;
    visitor.sign_in(&visitor_credentials()).await.unwrap();

    for app in [&mut anonymous, &mut visitor] {
        assert_ne!(app.role(), Role::Owner);
        let target = app.projects()[0].clone();
        let calls = harness.backend.calls().unwrap();

        assert!(app.open_add().unwrap_err().is_unauthorized());
        assert!(app.open_delete(target.id).unwrap_err().is_unauthorized());

        let mut add = filled_form();
        assert!(app.submit(&mut add).await.unwrap_err().is_unauthorized());

        let mut edit = ProjectForm::edit(target.clone(), YEAR);
        assert!(app.submit(&mut edit).await.unwrap_err().is_unauthorized());

        assert!(app.delete(target.id).await.unwrap_err().is_unauthorized());

        assert_eq!(harness.backend.calls().unwrap(), calls);
        assert!(app
            .last_error()
            .is_some_and(|m| m.starts_with("Owner role required")));
    }
}

#[tokio::test]
async fn opening_a_project_depends_on_role() {
    let harness = Harness::seeded();
    let mut anonymous = harness.orchestrator().await;
    anonymous.load().await.unwrap();
    let id = anonymous.projects()[0].id;
    assert_eq!(anonymous.open_project(id).unwrap().mode(), ModalMode::View);

    let owner = harness.owner_orchestrator().await;
    assert_eq!(owner.open_project(id).unwrap().mode(), ModalMode::Edit);
}

#[tokio::test]
async fn opening_an_unknown_project_is_not_found() {
    let harness = Harness::seeded();
    let owner = harness.owner_orchestrator().await;
    let err = owner.open_project(uuid::Uuid::new_v4()).unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::NotFound { entity: "project", .. }));
}

#[tokio::test]
async fn owner_create_refetches_collection() {
    let harness = Harness::seeded();
    let mut app = harness.owner_orchestrator().await;
    let before = app.projects().len();

    let mut form = app.open_add().unwrap();
    form.set_text(ProjectField::Title, "Habit Coach").unwrap();
    let outcome = app.submit(&mut form).await.unwrap();

    let created = assert_matches!(outcome, SubmitOutcome::Saved(p) => p);
    assert_eq!(created.user_id, harness.owner.id);
    assert_eq!(created.year, YEAR);
    assert_eq!(app.projects().len(), before + 1);
    assert_eq!(app.projects()[0].id, created.id);
    assert_eq!(app.state(), OperationState::Idle);
    assert!(app.last_error().is_none());
}

#[tokio::test]
async fn failed_create_leaves_collection_unchanged() {
    let harness = Harness::seeded();
    let mut app = harness.owner_orchestrator().await;
    let before = app.projects().to_vec();
    let stored = harness.backend.rows().unwrap().len();

    harness.backend.fail_next(FailureKind::Network).unwrap();
    let mut form = filled_form();
    let err = app.create(&mut form).await.unwrap_err();

    assert_matches!(err, ClientError::Core(CoreError::Network(_)));
    assert_eq!(app.projects(), before.as_slice());
    assert_eq!(harness.backend.rows().unwrap().len(), stored);
    assert!(app.last_error().is_some());
    assert_eq!(app.state(), OperationState::Idle);
}

#[tokio::test]
async fn invalid_draft_is_blocked_before_the_backend() {
    let harness = Harness::seeded();
    let mut app = harness.owner_orchestrator().await;
    let calls = harness.backend.calls().unwrap();

    let mut form = app.open_add().unwrap();
    form.set_year(1899);
    let outcome = app.submit(&mut form).await.unwrap();

    let errors = assert_matches!(outcome, SubmitOutcome::Blocked(e) => e);
    assert_eq!(errors.get(ProjectField::Title), Some(MSG_TITLE_REQUIRED));
    assert!(errors.contains(ProjectField::Year));
    assert_eq!(harness.backend.calls().unwrap(), calls);
    assert!(app.last_error().is_none());
}

#[tokio::test]
async fn owner_edit_keeps_ownership() {
    let harness = Harness::seeded();
    let mut app = harness.owner_orchestrator().await;
    let target = app
        .projects()
        .iter()
        .find(|p| p.title == "Budget Tracker")
        .cloned()
        .unwrap();

    let mut form = app.open_project(target.id).unwrap();
    form.set_text(ProjectField::Title, "Budget Tracker v2").unwrap();
    form.set_private(true);
    let updated = assert_matches!(app.submit(&mut form).await.unwrap(), SubmitOutcome::Saved(p) => p);

    assert_eq!(updated.id, target.id);
    assert_eq!(updated.user_id, harness.owner.id);
    assert!(updated.private);
    assert!(updated.updated_at.is_some());
    assert!(app.projects().iter().any(|p| p.title == "Budget Tracker v2"));
}

#[tokio::test]
async fn owner_delete_removes_row_after_refetch() {
    let harness = Harness::seeded();
    let mut app = harness.owner_orchestrator().await;
    let id = app.projects()[0].id;

    let mut form = app.open_delete(id).unwrap();
    assert!(form.is_read_only());
    assert_eq!(app.submit(&mut form).await.unwrap(), SubmitOutcome::Deleted(id));
    assert!(app.projects().iter().all(|p| p.id != id));
}

#[tokio::test]
async fn backend_rejection_surfaces_a_message() {
    let harness = Harness::seeded();
    let mut app = harness.owner_orchestrator().await;
    let id = app.projects()[0].id;

    harness.backend.fail_next(FailureKind::Unauthorized).unwrap();
    let err = app.delete(id).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(app.last_error(), Some("JWT expired"));
    assert!(app.projects().iter().any(|p| p.id == id));
}

#[tokio::test]
async fn deleting_a_vanished_row_is_not_found() {
    let harness = Harness::seeded();
    let mut app = harness.owner_orchestrator().await;

    let err = app.delete(uuid::Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::NotFound { .. }));
    assert!(app.last_error().is_some_and(|m| m.contains("not found")));
}

#[tokio::test]
async fn view_form_cannot_be_submitted() {
    let harness = Harness::seeded();
    let mut app = harness.orchestrator().await;
    app.load().await.unwrap();
    let mut form = app.open_project(app.projects()[0].id).unwrap();
    assert_matches!(
        app.submit(&mut form).await,
        Err(ClientError::Core(CoreError::Validation(_)))
    );
}
