//! Project domain model.
//!
//! # Responsibility
//! - Define the budgeted project record shown in the project list.
//! - Validate project form drafts before a record is created.
//!
//! # Invariants
//! - `id` is generated once at creation and never reused.
//! - `total_hours` is strictly positive for every record created through
//!   `Project::from_draft`.
//! - Projects are immutable after creation; removal is the only lifecycle step.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Color used by the project form when the user keeps the default.
pub const DEFAULT_PROJECT_COLOR: &str = "#3B82F6";

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex color regex")
});

/// Opaque project identifier.
///
/// New ids are UUID v4 strings, but any non-empty string loaded from
/// persisted data is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ProjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Budgeted project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Hour budget for the whole project.
    pub total_hours: u32,
    /// Hex color, `#RGB` or `#RRGGBB`.
    pub color: String,
}

/// Raw project form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub total_hours: i64,
    pub color: String,
}

impl ProjectDraft {
    /// Creates a draft with the default form color.
    pub fn new(name: impl Into<String>, total_hours: i64) -> Self {
        Self {
            name: name.into(),
            total_hours,
            color: DEFAULT_PROJECT_COLOR.to_string(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Checks required fields and the positive hour budget.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        if self.total_hours <= 0 || self.total_hours > i64::from(u32::MAX) {
            return Err(ProjectValidationError::InvalidTotalHours(self.total_hours));
        }
        if !HEX_COLOR_RE.is_match(self.color.trim()) {
            return Err(ProjectValidationError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

impl Project {
    /// Builds a new project with a generated id from validated form input.
    pub fn from_draft(draft: &ProjectDraft) -> Result<Self, ProjectValidationError> {
        Self::from_draft_with_id(ProjectId::generate(), draft)
    }

    /// Builds a project with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn from_draft_with_id(
        id: ProjectId,
        draft: &ProjectDraft,
    ) -> Result<Self, ProjectValidationError> {
        draft.validate()?;
        let total_hours = u32::try_from(draft.total_hours)
            .map_err(|_| ProjectValidationError::InvalidTotalHours(draft.total_hours))?;
        Ok(Self {
            id,
            name: draft.name.trim().to_string(),
            total_hours,
            color: draft.color.trim().to_string(),
        })
    }
}

/// Rejection reasons for project form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyName,
    InvalidTotalHours(i64),
    InvalidColor(String),
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "project name must not be blank"),
            Self::InvalidTotalHours(value) => {
                write!(f, "total hours must be a positive integer, got {value}")
            }
            Self::InvalidColor(value) => write!(f, "invalid hex color `{value}`"),
        }
    }
}

impl Error for ProjectValidationError {}
