//! Validation limits, messages and the field-error map.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::project::ProjectField;

/// Maximum title length in code points.
pub const TITLE_MAX_CHARS: usize = 255;

/// Earliest accepted project year.
pub const MIN_YEAR: i32 = 1900;

/// How many years past the current one a project may be dated.
pub const YEAR_LOOKAHEAD: i32 = 10;

pub const MSG_TITLE_REQUIRED: &str = "Project title is required";
pub const MSG_TITLE_TOO_LONG: &str = "Title must be less than 255 characters";
pub const MSG_INVALID_URL: &str = "Please enter a valid URL";

/// Fields that must hold an absolute URL when non-empty.
pub const URL_FIELDS: [ProjectField; 3] = [
    ProjectField::Link,
    ProjectField::Github,
    ProjectField::PreviewImageUrl,
];

/// Latest accepted year for a given current year.
pub fn max_year(current_year: i32) -> i32 {
    current_year + YEAR_LOOKAHEAD
}

/// Message for an out-of-range year.
pub fn year_range_message(current_year: i32) -> String {
    format!("Year must be between {MIN_YEAR} and {}", max_year(current_year))
}

/// Calendar year of the system clock (UTC).
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Field name → human-readable message. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<ProjectField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: ProjectField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: ProjectField) -> bool {
        self.0.contains_key(&field)
    }

    /// Set or clear the error for one field.
    pub fn set(&mut self, field: ProjectField, error: Option<String>) {
        match error {
            Some(message) => {
                self.0.insert(field, message);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProjectField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// Fields in error, in declaration order.
    pub fn fields(&self) -> Vec<ProjectField> {
        self.0.keys().copied().collect()
    }
}

/// Result of validating a whole draft. Never both valid and in error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(FieldErrors),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The error map; empty when valid.
    pub fn into_errors(self) -> FieldErrors {
        match self {
            Self::Valid => FieldErrors::new(),
            Self::Invalid(errors) => errors,
        }
    }
}

impl From<FieldErrors> for ValidationOutcome {
    fn from(errors: FieldErrors) -> Self {
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(errors)
        }
    }
}
