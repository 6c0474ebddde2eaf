//! Search & sort over the in-memory project collection.
//!
//! Pure functions of (collection, query, field, direction); safe to re-run
//! on every keystroke. The input is expected to have passed the visibility
//! filter already.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::project::Project;

// ---------------------------------------------------------------------------
// Sort state
// ---------------------------------------------------------------------------

/// Column a listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Title,
    Description,
    Category,
    Year,
}

impl SortField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Category => "category",
            Self::Year => "year",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "category" => Ok(Self::Category),
            "year" => Ok(Self::Year),
            other => Err(format!(
                "Invalid sort field '{other}'. Must be one of: title, description, category, year"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Header click: the active field flips direction, a new field starts
    /// ascending.
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.toggled();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Grid of cards or table of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Grid => Self::List,
            Self::List => Self::Grid,
        }
    }
}

/// Transient listing UI state. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub query: String,
    pub sort: SortState,
    pub view: ViewMode,
}

impl QueryState {
    /// Apply this state to a visible collection.
    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        search_and_sort(projects, &self.query, self.sort)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Case-insensitive substring match against title, description, category
/// and the decimal year. An empty query matches everything.
pub fn matches_query(project: &Project, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();

    project.title.to_lowercase().contains(&needle)
        || project
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
        || project
            .category
            .is_some_and(|c| c.label().to_lowercase().contains(&needle))
        || project.year.to_string().contains(&needle)
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

fn compare(a: &Project, b: &Project, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Description => lower(a.description.as_deref()).cmp(&lower(b.description.as_deref())),
        SortField::Category => {
            lower(a.category.map(|c| c.label())).cmp(&lower(b.category.map(|c| c.label())))
        }
        SortField::Year => a.year.cmp(&b.year),
    }
}

fn lower(value: Option<&str>) -> String {
    value.unwrap_or_default().to_lowercase()
}

/// Filter by `query` then stable-sort by `sort`. Ties keep the input order,
/// which for datastore listings is newest first.
pub fn search_and_sort<'a>(projects: &'a [Project], query: &str, sort: SortState) -> Vec<&'a Project> {
    let mut matched: Vec<&Project> = projects.iter().filter(|p| matches_query(p, query)).collect();
    matched.sort_by(|a, b| sort.direction.apply(compare(a, b, sort.field)));
    matched
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
