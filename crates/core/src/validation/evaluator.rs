//! Draft evaluator. Pure logic; the current year is passed in.

use crate::project::{ProjectDraft, ProjectField};

use super::rules::{
    max_year, year_range_message, FieldErrors, ValidationOutcome, MIN_YEAR, MSG_INVALID_URL,
    MSG_TITLE_REQUIRED, MSG_TITLE_TOO_LONG, TITLE_MAX_CHARS, URL_FIELDS,
};

/// Validate every rule-bearing field of a draft.
pub fn validate_draft(draft: &ProjectDraft, current_year: i32) -> ValidationOutcome {
    let mut errors = FieldErrors::new();
    for field in [ProjectField::Title, ProjectField::Year]
        .into_iter()
        .chain(URL_FIELDS)
    {
        errors.set(field, validate_field(draft, field, current_year));
    }
    errors.into()
}

/// Validate a single field. Fields without rules always pass.
pub fn validate_field(draft: &ProjectDraft, field: ProjectField, current_year: i32) -> Option<String> {
    match field {
        ProjectField::Title => check_title(&draft.title),
        ProjectField::Link => check_optional_url(&draft.link),
        ProjectField::Github => check_optional_url(&draft.github),
        ProjectField::PreviewImageUrl => check_optional_url(&draft.preview_image_url),
        ProjectField::Year => check_year(draft.year, current_year),
        ProjectField::Description
        | ProjectField::Status
        | ProjectField::Category
        | ProjectField::Featured
        | ProjectField::Private => None,
    }
}

/// Re-check one field after an edit, leaving every other entry untouched.
pub fn revalidate_field(
    errors: &mut FieldErrors,
    draft: &ProjectDraft,
    field: ProjectField,
    current_year: i32,
) {
    errors.set(field, validate_field(draft, field, current_year));
}

fn check_title(title: &str) -> Option<String> {
    if title.trim().is_empty() {
        Some(MSG_TITLE_REQUIRED.to_string())
    } else if title.chars().count() > TITLE_MAX_CHARS {
        Some(MSG_TITLE_TOO_LONG.to_string())
    } else {
        None
    }
}

fn check_optional_url(value: &str) -> Option<String> {
    if value.is_empty() || is_valid_url(value) {
        None
    } else {
        Some(MSG_INVALID_URL.to_string())
    }
}

fn check_year(year: i32, current_year: i32) -> Option<String> {
    if (MIN_YEAR..=max_year(current_year)).contains(&year) {
        None
    } else {
        Some(year_range_message(current_year))
    }
}

/// Absolute URL with a scheme and a non-empty host.
pub fn is_valid_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => parsed.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}
