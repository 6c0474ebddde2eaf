//! Project orchestrator.
//!
//! Owns the in-memory project collection for one session. Every user
//! action runs through the permission gate before it reaches a backend,
//! and every successful mutation is followed by a full re-fetch. Failed
//! actions leave the collection as it was and record a surfaced message.

use std::sync::Arc;

use folio_core::backend::{Credentials, ImageUploader, ListingQuery, ProjectStore};
use folio_core::error::CoreError;
use folio_core::permissions::{authorize, Action};
use folio_core::project::{Project, ProjectField};
use folio_core::roles::Role;
use folio_core::search::{QueryState, SortField, ViewMode};
use folio_core::types::ProjectId;
use folio_core::upload::{validate_image, ImageFile};
use folio_core::validation::rules::{current_year, FieldErrors};
use folio_core::visibility::{filter_visible, is_visible, ListingScope};

use crate::error::{ClientError, ClientResult};
use crate::form::{ModalMode, ProjectForm};
use crate::session::Session;

/// Progress of the current data-affecting operation.
///
/// An operation goes `Idle -> Loading` and always returns to `Idle`. Success
/// and failure are not separate states: the action's `Result` carries the
/// outcome and a failure also leaves its message in
/// [`ProjectOrchestrator::last_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    Loading,
}

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Stored row as returned by the backend.
    Saved(Project),
    Deleted(ProjectId),
    /// Validation failed; nothing was sent.
    Blocked(FieldErrors),
}

pub struct ProjectOrchestrator {
    session: Session,
    store: Arc<dyn ProjectStore>,
    uploader: Arc<dyn ImageUploader>,
    projects: Vec<Project>,
    query: QueryState,
    scope: Option<ListingScope>,
    featured_only: bool,
    state: OperationState,
    last_error: Option<String>,
    current_year: i32,
}

impl ProjectOrchestrator {
    pub fn new(session: Session, store: Arc<dyn ProjectStore>, uploader: Arc<dyn ImageUploader>) -> Self {
        Self {
            session,
            store,
            uploader,
            projects: Vec::new(),
            query: QueryState::default(),
            scope: None,
            featured_only: false,
            state: OperationState::Idle,
            last_error: None,
            current_year: current_year(),
        }
    }

    /// Pin the year used for form validation.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn role(&self) -> Role {
        self.session.role()
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Triggers for data-affecting actions should be disabled while busy.
    pub fn is_busy(&self) -> bool {
        self.state == OperationState::Loading
    }

    /// Message from the last failed action, cleared when the next starts.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Loaded collection, newest first, before search and sort.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Listing scope for the next load. Defaults to the role's own scope.
    pub fn scope(&self) -> ListingScope {
        self.scope
            .unwrap_or_else(|| ListingScope::for_role(self.session.role()))
    }

    // -----------------------------------------------------------------------
    // Operation bookkeeping
    // -----------------------------------------------------------------------

    fn begin(&mut self) {
        self.state = OperationState::Loading;
        self.last_error = None;
    }

    fn finish<T>(&mut self, result: ClientResult<T>) -> ClientResult<T> {
        self.state = OperationState::Idle;
        if let Err(e) = &result {
            self.last_error = Some(e.surface());
        }
        result
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// Fetch the collection for the current role and scope.
    pub async fn load(&mut self) -> ClientResult<usize> {
        self.begin();
        let result = self.fetch().await;
        self.finish(result)
    }

    async fn fetch(&mut self) -> ClientResult<usize> {
        let role = self.session.role();
        let scope = self.scope();
        if scope != ListingScope::Public {
            authorize(role, Action::ViewPrivateListing)?;
        }

        let query = ListingQuery {
            scope,
            featured_only: self.featured_only,
        };
        let rows = self.store.list(query).await?;
        let received = rows.len();
        let rows = filter_visible(rows, role);
        if rows.len() != received {
            tracing::warn!(
                dropped = received - rows.len(),
                role = %role,
                "Backend returned private projects to a non-owner"
            );
        }

        tracing::debug!(count = rows.len(), scope = scope.name(), "Projects loaded");
        self.projects = rows;
        Ok(self.projects.len())
    }

    /// Re-fetch after a successful mutation. A failure here is recorded
    /// but does not undo the mutation's success.
    async fn refetch(&mut self) {
        if let Err(e) = self.fetch().await {
            tracing::warn!(error = %e, "Re-fetch after mutation failed");
            self.last_error = Some(e.surface());
        }
    }

    /// Visible projects after search and sort.
    pub fn visible_projects(&self) -> Vec<&Project> {
        let role = self.session.role();
        self.query
            .apply(&self.projects)
            .into_iter()
            .filter(|p| is_visible(p, role))
            .collect()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query.query = query.into();
    }

    /// Header click: toggles direction on the active field, otherwise
    /// switches field ascending.
    pub fn select_sort(&mut self, field: SortField) {
        self.query.sort.select(field);
    }

    pub fn toggle_view(&mut self) -> ViewMode {
        self.query.view = self.query.view.toggled();
        self.query.view
    }

    /// Takes effect on the next [`load`](Self::load). `None` restores the
    /// role's default scope.
    pub fn set_scope(&mut self, scope: Option<ListingScope>) {
        self.scope = scope;
    }

    pub fn set_featured_only(&mut self, featured_only: bool) {
        self.featured_only = featured_only;
    }

    // -----------------------------------------------------------------------
    // Forms
    // -----------------------------------------------------------------------

    fn find(&self, id: ProjectId) -> Result<&Project, CoreError> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            })
    }

    pub fn open_add(&self) -> ClientResult<ProjectForm> {
        authorize(self.session.role(), Action::Create)?;
        Ok(ProjectForm::add(self.current_year))
    }

    /// Owner gets an edit form, everyone else a read-only view.
    pub fn open_project(&self, id: ProjectId) -> ClientResult<ProjectForm> {
        let project = self.find(id)?.clone();
        Ok(ProjectForm::for_project(project, self.session.role(), self.current_year))
    }

    pub fn open_delete(&self, id: ProjectId) -> ClientResult<ProjectForm> {
        authorize(self.session.role(), Action::Delete)?;
        let project = self.find(id)?.clone();
        Ok(ProjectForm::delete(project, self.current_year))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Dispatch a form according to its mode.
    pub async fn submit(&mut self, form: &mut ProjectForm) -> ClientResult<SubmitOutcome> {
        match form.mode() {
            ModalMode::Add => self.create(form).await,
            ModalMode::Edit => self.update(form).await,
            ModalMode::Delete => {
                let id = form_project_id(form)?;
                self.delete(id).await
            }
            ModalMode::View => Err(CoreError::Validation("A read-only form cannot be submitted".into()).into()),
        }
    }

    pub async fn create(&mut self, form: &mut ProjectForm) -> ClientResult<SubmitOutcome> {
        self.begin();
        let result = self.create_inner(form).await;
        self.finish(result)
    }

    async fn create_inner(&mut self, form: &mut ProjectForm) -> ClientResult<SubmitOutcome> {
        authorize(self.session.role(), Action::Create)?;
        let owner = self
            .session
            .identity()
            .map(|i| i.id)
            .ok_or_else(|| ClientError::unauthorized("Sign in to create projects"))?;
        if !form.validate_all() {
            return Ok(SubmitOutcome::Blocked(form.errors().clone()));
        }

        let created = self.store.create(owner, &form.draft().to_changes()).await?;
        tracing::info!(project_id = %created.id, "Project created");
        self.refetch().await;
        Ok(SubmitOutcome::Saved(created))
    }

    pub async fn update(&mut self, form: &mut ProjectForm) -> ClientResult<SubmitOutcome> {
        self.begin();
        let result = self.update_inner(form).await;
        self.finish(result)
    }

    async fn update_inner(&mut self, form: &mut ProjectForm) -> ClientResult<SubmitOutcome> {
        authorize(self.session.role(), Action::Edit)?;
        let id = form_project_id(form)?;
        if !form.validate_all() {
            return Ok(SubmitOutcome::Blocked(form.errors().clone()));
        }

        let updated = self.store.update(id, &form.draft().to_changes()).await?;
        tracing::info!(project_id = %id, "Project updated");
        self.refetch().await;
        Ok(SubmitOutcome::Saved(updated))
    }

    pub async fn delete(&mut self, id: ProjectId) -> ClientResult<SubmitOutcome> {
        self.begin();
        let result = self.delete_inner(id).await;
        self.finish(result)
    }

    async fn delete_inner(&mut self, id: ProjectId) -> ClientResult<SubmitOutcome> {
        authorize(self.session.role(), Action::Delete)?;
        self.store.delete(id).await?;
        tracing::info!(project_id = %id, "Project deleted");
        self.refetch().await;
        Ok(SubmitOutcome::Deleted(id))
    }

    /// Upload a preview image and write its URL into the form. On any
    /// failure the form keeps its previous URL.
    pub async fn upload_image(&mut self, form: &mut ProjectForm, image: &ImageFile) -> ClientResult<String> {
        self.begin();
        let result = self.upload_inner(form, image).await;
        self.finish(result)
    }

    async fn upload_inner(&mut self, form: &mut ProjectForm, image: &ImageFile) -> ClientResult<String> {
        validate_image(&image.content_type, image.size())?;
        authorize(self.session.role(), Action::UploadImage)?;

        let url = self.uploader.upload(image).await?;
        form.update_field(ProjectField::PreviewImageUrl, |d| d.preview_image_url = url.clone());
        Ok(url)
    }

    // -----------------------------------------------------------------------
    // Session changes
    // -----------------------------------------------------------------------

    /// Password sign-in, then reload for the new role.
    pub async fn sign_in(&mut self, credentials: &Credentials) -> ClientResult<Role> {
        self.begin();
        let result = match self.session.sign_in(credentials).await {
            Ok(role) => {
                self.scope = None;
                self.fetch().await.map(|_| role)
            }
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    /// Register an account. Reloads only when the provider signed the new
    /// account in straight away.
    pub async fn sign_up(&mut self, credentials: &Credentials) -> ClientResult<Option<Role>> {
        self.begin();
        let result = match self.session.sign_up(credentials).await {
            Ok(Some(role)) => {
                self.scope = None;
                self.fetch().await.map(|_| Some(role))
            }
            other => other,
        };
        self.finish(result)
    }

    /// Sign out and reload as anonymous. Local state is dropped even when
    /// the provider call fails.
    pub async fn sign_out(&mut self) -> ClientResult<Role> {
        self.begin();
        let signed_out = self.session.sign_out().await;
        self.scope = None;
        self.projects.clear();
        let reloaded = self.fetch().await;
        let result = signed_out.and_then(|role| reloaded.map(|_| role));
        self.finish(result)
    }

    pub async fn enter_guest(&mut self) -> ClientResult<Role> {
        let role = self.session.enter_guest()?;
        self.load().await?;
        Ok(role)
    }

    pub async fn exit_guest(&mut self) -> ClientResult<Role> {
        let role = self.session.exit_guest()?;
        self.load().await?;
        Ok(role)
    }

    /// Apply pending identity events and reload if the role changed.
    pub async fn sync_session(&mut self) -> ClientResult<Role> {
        if self.session.sync_events()? {
            self.scope = None;
            self.load().await?;
        }
        Ok(self.session.role())
    }
}

fn form_project_id(form: &ProjectForm) -> ClientResult<ProjectId> {
    form.project()
        .map(|p| p.id)
        .ok_or_else(|| CoreError::Validation("Form has no project selected".into()).into())
}
