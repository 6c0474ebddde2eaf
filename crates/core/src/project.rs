//! Project record, its enumerations, and the form draft / write payloads.
//!
//! Wire names match the hosted `projects` table: status labels are the
//! human-readable strings (`"Not Started"`, ...) and an empty category is
//! stored as `""`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::{ProjectId, Timestamp, UserId};

/// Name of the datastore collection holding project rows.
pub const PROJECTS_TABLE: &str = "projects";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Progress status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

    /// Human-readable label, identical to the stored value.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Parse a label case-insensitively.
    pub fn from_label(label: &str) -> Result<Self, CoreError> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown status '{label}'. Must be one of: Not Started, In Progress, Completed"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Fixed category label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectCategory {
    Fun,
    Finance,
    Career,
    Knowledge,
    Innovation,
    Productivity,
}

impl ProjectCategory {
    pub const ALL: [ProjectCategory; 6] = [
        Self::Fun,
        Self::Finance,
        Self::Career,
        Self::Knowledge,
        Self::Innovation,
        Self::Productivity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Fun => "Fun",
            Self::Finance => "Finance",
            Self::Career => "Career",
            Self::Knowledge => "Knowledge",
            Self::Innovation => "Innovation",
            Self::Productivity => "Productivity",
        }
    }

    /// Parse a label case-insensitively.
    pub fn from_label(label: &str) -> Result<Self, CoreError> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|c| c.label()).collect();
                CoreError::Validation(format!(
                    "Unknown category '{label}'. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// Accepts `null`, `""` or a known label.
fn category_or_empty<'de, D>(deserializer: D) -> Result<Option<ProjectCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => ProjectCategory::from_label(label)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A row of the `projects` collection as returned by the datastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub preview_image_url: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default, deserialize_with = "category_or_empty")]
    pub category: Option<ProjectCategory>,
    pub year: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub private: bool,
    pub user_id: UserId,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Project {
    /// External link, treating an empty string as absent.
    pub fn link(&self) -> Option<&str> {
        non_empty(&self.link)
    }

    /// Source repository link, treating an empty string as absent.
    pub fn github(&self) -> Option<&str> {
        non_empty(&self.github)
    }

    /// Preview image URL, treating an empty string as absent.
    pub fn preview_image_url(&self) -> Option<&str> {
        non_empty(&self.preview_image_url)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Editable fields of a project draft. Serialized as the column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectField {
    Title,
    Description,
    Link,
    Github,
    PreviewImageUrl,
    Status,
    Category,
    Year,
    Featured,
    Private,
}

impl ProjectField {
    /// Column name of the field.
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Link => "link",
            Self::Github => "github",
            Self::PreviewImageUrl => "preview_image_url",
            Self::Status => "status",
            Self::Category => "category",
            Self::Year => "year",
            Self::Featured => "featured",
            Self::Private => "private",
        }
    }
}

impl std::fmt::Display for ProjectField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Client-only working copy of a project while a form is open.
///
/// Optional text fields are plain strings here; an empty string means
/// "not set" and is mapped to `None` by [`ProjectDraft::to_changes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub link: String,
    pub github: String,
    pub preview_image_url: String,
    pub status: ProjectStatus,
    pub category: Option<ProjectCategory>,
    pub year: i32,
    pub featured: bool,
    pub private: bool,
}

impl ProjectDraft {
    /// Empty template used by the "add" form.
    pub fn empty(current_year: i32) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            link: String::new(),
            github: String::new(),
            preview_image_url: String::new(),
            status: ProjectStatus::NotStarted,
            category: None,
            year: current_year,
            featured: false,
            private: false,
        }
    }

    /// Working copy of an existing record.
    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone().unwrap_or_default(),
            link: project.link.clone().unwrap_or_default(),
            github: project.github.clone().unwrap_or_default(),
            preview_image_url: project.preview_image_url.clone().unwrap_or_default(),
            status: project.status,
            category: project.category,
            year: project.year,
            featured: project.featured,
            private: project.private,
        }
    }

    /// Write payload for create/update. Never carries the owning user.
    pub fn to_changes(&self) -> ProjectChanges {
        ProjectChanges {
            title: self.title.trim().to_string(),
            description: optional(&self.description),
            link: optional(&self.link),
            github: optional(&self.github),
            preview_image_url: optional(&self.preview_image_url),
            status: self.status,
            category: self.category,
            year: self.year,
            featured: self.featured,
            private: self.private,
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Columns a client may write. `id`, `user_id` and timestamps are absent
/// so an update can never reassign ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectChanges {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub github: Option<String>,
    pub preview_image_url: Option<String>,
    pub status: ProjectStatus,
    pub category: Option<ProjectCategory>,
    pub year: i32,
    pub featured: bool,
    pub private: bool,
}

/// Insert payload: the writable columns plus the owning user.
#[derive(Debug, Clone, Serialize)]
pub struct NewProject<'a> {
    #[serde(flatten)]
    pub changes: &'a ProjectChanges,
    pub user_id: UserId,
}
