//! Day allocation model.
//!
//! # Responsibility
//! - Represent the one or two projects assigned to a single calendar day.
//! - Derive the per-project hours for that day from its split.
//!
//! # Invariants
//! - `project_ids` holds one or two ids; an empty allocation never exists.
//! - A project id appears at most once per day.
//! - Index 0 is the first-assigned (primary) project.

use crate::model::calendar::DayKey;
use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum number of concurrent projects on one day.
pub const MAX_PROJECTS_PER_DAY: usize = 2;
/// Hours credited when a project has the day to itself.
pub const SOLO_DAY_HOURS: u32 = 6;
/// Hours credited to each project when the day is shared.
pub const SHARED_DAY_HOURS: u32 = 3;

/// Projects assigned to one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    date: DayKey,
    project_ids: Vec<ProjectId>,
}

impl Allocation {
    /// Allocation with a single project.
    pub fn solo(date: DayKey, project_id: ProjectId) -> Self {
        Self {
            date,
            project_ids: vec![project_id],
        }
    }

    /// Builds an allocation from an ordered id list.
    ///
    /// # Errors
    /// - `Empty` when no ids are given.
    /// - `TooManyProjects` above `MAX_PROJECTS_PER_DAY`.
    /// - `DuplicateProject` when an id repeats.
    pub fn try_new(date: DayKey, project_ids: Vec<ProjectId>) -> Result<Self, AllocationError> {
        if project_ids.is_empty() {
            return Err(AllocationError::Empty(date));
        }
        if project_ids.len() > MAX_PROJECTS_PER_DAY {
            return Err(AllocationError::TooManyProjects {
                date,
                count: project_ids.len(),
            });
        }
        if project_ids.len() == 2 && project_ids[0] == project_ids[1] {
            return Err(AllocationError::DuplicateProject {
                date,
                project_id: project_ids[0].clone(),
            });
        }
        Ok(Self { date, project_ids })
    }

    pub fn date(&self) -> DayKey {
        self.date
    }

    pub fn project_ids(&self) -> &[ProjectId] {
        &self.project_ids
    }

    pub fn contains(&self, project_id: &ProjectId) -> bool {
        self.project_ids.contains(project_id)
    }

    pub fn is_shared(&self) -> bool {
        self.project_ids.len() >= MAX_PROJECTS_PER_DAY
    }

    /// Hours each assigned project receives on this day.
    pub fn hours_per_project(&self) -> u32 {
        if self.is_shared() {
            SHARED_DAY_HOURS
        } else {
            SOLO_DAY_HOURS
        }
    }

    /// Hours `project_id` receives on this day, `None` when not assigned.
    pub fn hours_for(&self, project_id: &ProjectId) -> Option<u32> {
        self.contains(project_id)
            .then(|| self.hours_per_project())
    }

    /// Appends a second project. Returns `false` when full or already present.
    pub(crate) fn push(&mut self, project_id: ProjectId) -> bool {
        if self.is_shared() || self.contains(&project_id) {
            return false;
        }
        self.project_ids.push(project_id);
        true
    }

    /// Removes `project_id`, keeping the order of the rest.
    ///
    /// The caller must drop the allocation when this leaves it empty.
    pub(crate) fn remove(&mut self, project_id: &ProjectId) -> bool {
        let before = self.project_ids.len();
        self.project_ids.retain(|id| id != project_id);
        self.project_ids.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.project_ids.is_empty()
    }
}

/// Shape violations when building an allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    Empty(DayKey),
    TooManyProjects { date: DayKey, count: usize },
    DuplicateProject { date: DayKey, project_id: ProjectId },
}

impl Display for AllocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(date) => write!(f, "allocation for {date} has no projects"),
            Self::TooManyProjects { date, count } => write!(
                f,
                "allocation for {date} has {count} projects; at most {MAX_PROJECTS_PER_DAY} allowed"
            ),
            Self::DuplicateProject { date, project_id } => {
                write!(f, "allocation for {date} lists project {project_id} twice")
            }
        }
    }
}

impl Error for AllocationError {}

#[cfg(test)]
mod tests {
    use super::{Allocation, AllocationError, SHARED_DAY_HOURS, SOLO_DAY_HOURS};
    use crate::model::calendar::DayKey;
    use crate::model::project::ProjectId;

    fn day() -> DayKey {
        DayKey::from_ymd(2024, 3, 1).unwrap()
    }

    #[test]
    fn solo_and_shared_hours() {
        let p1 = ProjectId::from("p1");
        let p2 = ProjectId::from("p2");
        let mut allocation = Allocation::solo(day(), p1.clone());
        assert_eq!(allocation.hours_for(&p1), Some(SOLO_DAY_HOURS));
        assert_eq!(allocation.hours_for(&p2), None);

        assert!(allocation.push(p2.clone()));
        assert_eq!(allocation.hours_for(&p1), Some(SHARED_DAY_HOURS));
        assert_eq!(allocation.hours_for(&p2), Some(SHARED_DAY_HOURS));
    }

    #[test]
    fn push_refuses_third_project_and_duplicates() {
        let mut allocation = Allocation::solo(day(), ProjectId::from("p1"));
        assert!(!allocation.push(ProjectId::from("p1")));
        assert!(allocation.push(ProjectId::from("p2")));
        assert!(!allocation.push(ProjectId::from("p3")));
        assert_eq!(allocation.project_ids().len(), 2);
    }

    #[test]
    fn try_new_rejects_invalid_shapes() {
        assert_eq!(
            Allocation::try_new(day(), Vec::new()).unwrap_err(),
            AllocationError::Empty(day())
        );
        assert!(matches!(
            Allocation::try_new(
                day(),
                vec!["a".into(), "b".into(), "c".into()]
            ),
            Err(AllocationError::TooManyProjects { count: 3, .. })
        ));
        assert!(matches!(
            Allocation::try_new(day(), vec!["a".into(), "a".into()]),
            Err(AllocationError::DuplicateProject { .. })
        ));
    }

    #[test]
    fn serializes_current_wire_shape() {
        let allocation =
            Allocation::try_new(day(), vec![ProjectId::from("p1"), ProjectId::from("p2")])
                .unwrap();
        let json = serde_json::to_value(&allocation).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "date": "2024-03-01", "projectIds": ["p1", "p2"] })
        );
    }
}
