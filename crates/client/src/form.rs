//! Project form state: modal mode, draft and per-field errors.

use folio_core::error::CoreError;
use folio_core::project::{Project, ProjectCategory, ProjectDraft, ProjectField, ProjectStatus};
use folio_core::roles::Role;
use folio_core::validation::evaluator::{revalidate_field, validate_draft};
use folio_core::validation::rules::{FieldErrors, ValidationOutcome};

/// What an open project modal is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMode {
    View,
    Add,
    Edit,
    Delete,
}

impl ModalMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// An open project modal.
///
/// Field errors are state: an edit re-checks only the edited field, and a
/// submit re-checks all of them.
#[derive(Debug, Clone)]
pub struct ProjectForm {
    mode: ModalMode,
    project: Option<Project>,
    draft: ProjectDraft,
    errors: FieldErrors,
    current_year: i32,
}

impl ProjectForm {
    fn with(mode: ModalMode, project: Option<Project>, draft: ProjectDraft, current_year: i32) -> Self {
        Self {
            mode,
            project,
            draft,
            errors: FieldErrors::new(),
            current_year,
        }
    }

    /// Empty template for a new project.
    pub fn add(current_year: i32) -> Self {
        Self::with(ModalMode::Add, None, ProjectDraft::empty(current_year), current_year)
    }

    pub fn view(project: Project, current_year: i32) -> Self {
        let draft = ProjectDraft::from_project(&project);
        Self::with(ModalMode::View, Some(project), draft, current_year)
    }

    pub fn edit(project: Project, current_year: i32) -> Self {
        let draft = ProjectDraft::from_project(&project);
        Self::with(ModalMode::Edit, Some(project), draft, current_year)
    }

    pub fn delete(project: Project, current_year: i32) -> Self {
        let draft = ProjectDraft::from_project(&project);
        Self::with(ModalMode::Delete, Some(project), draft, current_year)
    }

    /// Opening a record: the owner edits, everyone else views.
    pub fn for_project(project: Project, role: Role, current_year: i32) -> Self {
        if role.is_owner() {
            Self::edit(project, current_year)
        } else {
            Self::view(project, current_year)
        }
    }

    pub fn mode(&self) -> ModalMode {
        self.mode
    }

    /// Record the form was opened on. `None` in add mode.
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn draft(&self) -> &ProjectDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.mode, ModalMode::View | ModalMode::Delete)
    }

    /// Change one field and re-check only that field.
    pub fn update_field(&mut self, field: ProjectField, change: impl FnOnce(&mut ProjectDraft)) {
        change(&mut self.draft);
        revalidate_field(&mut self.errors, &self.draft, field, self.current_year);
    }

    /// Set a free-text field.
    pub fn set_text(&mut self, field: ProjectField, value: impl Into<String>) -> Result<(), CoreError> {
        let value = value.into();
        let slot = match field {
            ProjectField::Title => &mut self.draft.title,
            ProjectField::Description => &mut self.draft.description,
            ProjectField::Link => &mut self.draft.link,
            ProjectField::Github => &mut self.draft.github,
            ProjectField::PreviewImageUrl => &mut self.draft.preview_image_url,
            other => {
                return Err(CoreError::Validation(format!("'{other}' is not a text field")));
            }
        };
        *slot = value;
        revalidate_field(&mut self.errors, &self.draft, field, self.current_year);
        Ok(())
    }

    pub fn set_status(&mut self, status: ProjectStatus) {
        self.update_field(ProjectField::Status, |d| d.status = status);
    }

    pub fn set_category(&mut self, category: Option<ProjectCategory>) {
        self.update_field(ProjectField::Category, |d| d.category = category);
    }

    pub fn set_year(&mut self, year: i32) {
        self.update_field(ProjectField::Year, |d| d.year = year);
    }

    pub fn set_featured(&mut self, featured: bool) {
        self.update_field(ProjectField::Featured, |d| d.featured = featured);
    }

    pub fn set_private(&mut self, private: bool) {
        self.update_field(ProjectField::Private, |d| d.private = private);
    }

    /// Re-check every field, replacing the error map.
    pub fn validate_all(&mut self) -> bool {
        self.errors = match validate_draft(&self.draft, self.current_year) {
            ValidationOutcome::Valid => FieldErrors::new(),
            ValidationOutcome::Invalid(errors) => errors,
        };
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use uuid::Uuid;

    use folio_core::validation::rules::{MSG_INVALID_URL, MSG_TITLE_REQUIRED};

    use super::*;

    const YEAR: i32 = 2025;

    fn project() -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "Portfolio Site".into(),
            description: None,
            link: Some("https://example.com".into()),
            github: None,
            preview_image_url: None,
            status: ProjectStatus::Completed,
            category: Some(ProjectCategory::Career),
            year: 2024,
            featured: true,
            private: false,
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn owner_opens_for_edit_others_view() {
        assert_eq!(ProjectForm::for_project(project(), Role::Owner, YEAR).mode(), ModalMode::Edit);
        for role in [Role::AuthenticatedGuest, Role::Anonymous] {
            let form = ProjectForm::for_project(project(), role, YEAR);
            assert_eq!(form.mode(), ModalMode::View);
            assert!(form.is_read_only());
        }
    }

    #[test]
    fn add_form_starts_clean() {
        let form = ProjectForm::add(YEAR);
        assert_eq!(form.mode(), ModalMode::Add);
        assert!(form.project().is_none());
        assert_eq!(form.draft().year, YEAR);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn clearing_title_flags_only_title() {
        let mut form = ProjectForm::edit(project(), YEAR);
        form.set_text(ProjectField::Title, "").unwrap();
        assert_eq!(form.errors().get(ProjectField::Title), Some(MSG_TITLE_REQUIRED));
        assert_eq!(form.errors().len(), 1);
    }

    #[test]
    fn bad_link_flags_only_link() {
        let mut form = ProjectForm::add(YEAR);
        form.set_text(ProjectField::Title, "X").unwrap();
        form.set_text(ProjectField::Link, "not-a-url").unwrap();
        assert_eq!(form.errors().fields(), vec![ProjectField::Link]);
        assert_eq!(form.errors().get(ProjectField::Link), Some(MSG_INVALID_URL));
    }

    #[test]
    fn fixing_a_field_clears_its_error() {
        let mut form = ProjectForm::add(YEAR);
        form.set_year(1899);
        assert!(form.errors().contains(ProjectField::Year));
        form.set_year(2020);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn validate_all_catches_untouched_fields() {
        let mut form = ProjectForm::add(YEAR);
        assert!(!form.validate_all());
        assert_eq!(form.errors().fields(), vec![ProjectField::Title]);

        form.set_text(ProjectField::Title, "X").unwrap();
        assert!(form.validate_all());
    }

    #[test]
    fn non_text_field_rejected_by_set_text() {
        let mut form = ProjectForm::add(YEAR);
        assert_matches!(form.set_text(ProjectField::Year, "2020"), Err(CoreError::Validation(_)));
    }
}
