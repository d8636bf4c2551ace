//! Planner session state.
//!
//! # Responsibility
//! - Own projects, allocations, and the transient UI pointers of one session.
//! - Enforce cross-collection invariants in single operations.
//!
//! # Invariants
//! - `selected_project`, when set, references an existing project.
//! - `delete_project` purges allocations and clears the selection together.
//! - Calendar clicks without a selection change nothing.

use crate::model::calendar::{DayKey, MonthCursor};
use crate::model::project::{Project, ProjectId};
use crate::store::allocation_store::{AllocationStore, ToggleOutcome};
use crate::usage::{self, ProjectUsage};

/// Effect of deleting one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRemoval {
    pub project: Project,
    /// Allocations that referenced the project before the purge.
    pub purged_allocations: usize,
    pub selection_cleared: bool,
}

/// Exclusively owned planning state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerState {
    projects: Vec<Project>,
    allocations: AllocationStore,
    selected_project: Option<ProjectId>,
    visible_month: MonthCursor,
}

impl PlannerState {
    pub fn new(projects: Vec<Project>, allocations: AllocationStore, month: MonthCursor) -> Self {
        Self {
            projects,
            allocations,
            selected_project: None,
            visible_month: month,
        }
    }

    /// Empty state showing `month`.
    pub fn empty(month: MonthCursor) -> Self {
        Self::new(Vec::new(), AllocationStore::new(), month)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn allocations(&self) -> &AllocationStore {
        &self.allocations
    }

    pub fn project(&self, project_id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| &project.id == project_id)
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.selected_project
            .as_ref()
            .and_then(|project_id| self.project(project_id))
    }

    pub fn visible_month(&self) -> MonthCursor {
        self.visible_month
    }

    /// Appends a project. Returns `false` when the id already exists.
    pub fn add_project(&mut self, project: Project) -> bool {
        if self.project(&project.id).is_some() {
            return false;
        }
        self.projects.push(project);
        true
    }

    /// Removes a project, purging its allocations and clearing a matching
    /// selection.
    pub fn delete_project(&mut self, project_id: &ProjectId) -> Option<ProjectRemoval> {
        let index = self
            .projects
            .iter()
            .position(|project| &project.id == project_id)?;
        let project = self.projects.remove(index);
        let purged_allocations = self.allocations.purge(project_id);
        let selection_cleared = self.selected_project.as_ref() == Some(project_id);
        if selection_cleared {
            self.selected_project = None;
        }
        Some(ProjectRemoval {
            project,
            purged_allocations,
            selection_cleared,
        })
    }

    /// Sets or clears the selection. Unknown ids are ignored.
    ///
    /// Returns whether the selection changed.
    pub fn select_project(&mut self, project_id: Option<&ProjectId>) -> bool {
        let next = match project_id {
            Some(project_id) if self.project(project_id).is_some() => Some(project_id.clone()),
            Some(_) => return false,
            None => None,
        };
        if next == self.selected_project {
            return false;
        }
        self.selected_project = next;
        true
    }

    /// Project-list click: selects `project_id`, or deselects it when it is
    /// already selected.
    pub fn toggle_selection(&mut self, project_id: &ProjectId) -> bool {
        if self.selected_project.as_ref() == Some(project_id) {
            return self.select_project(None);
        }
        self.select_project(Some(project_id))
    }

    /// Calendar-day click with the current selection.
    ///
    /// Returns `None` when no project is selected.
    pub fn toggle_day(&mut self, date: DayKey) -> Option<ToggleOutcome> {
        let project_id = self.selected_project.clone()?;
        Some(self.allocations.toggle(date, &project_id))
    }

    /// Removes one project from one day; see `AllocationStore::remove`.
    pub fn remove_allocation(&mut self, date: DayKey, project_id: &ProjectId) -> bool {
        self.allocations.remove(date, project_id)
    }

    pub fn show_month(&mut self, month: MonthCursor) {
        self.visible_month = month;
    }

    pub fn previous_month(&mut self) -> MonthCursor {
        self.visible_month = self.visible_month.previous();
        self.visible_month
    }

    pub fn next_month(&mut self) -> MonthCursor {
        self.visible_month = self.visible_month.next();
        self.visible_month
    }

    pub fn hours_used(&self, project_id: &ProjectId) -> u32 {
        usage::hours_used(&self.allocations, project_id)
    }

    /// Budget percentage; 0 for unknown projects.
    pub fn percent_used(&self, project_id: &ProjectId) -> u32 {
        self.project(project_id).map_or(0, |project| {
            usage::percent_used(self.hours_used(project_id), project.total_hours)
        })
    }

    pub fn usage_summary(&self) -> Vec<ProjectUsage> {
        usage::usage_summary(&self.allocations, &self.projects)
    }
}

#[cfg(test)]
mod tests {
    use super::PlannerState;
    use crate::model::calendar::{DayKey, MonthCursor};
    use crate::model::project::{Project, ProjectDraft, ProjectId};
    use crate::store::allocation_store::ToggleOutcome;

    fn state_with(ids: &[&str]) -> PlannerState {
        let mut state = PlannerState::empty(MonthCursor::new(2024, 3).unwrap());
        for id in ids {
            let project = Project::from_draft_with_id(
                ProjectId::from(*id),
                &ProjectDraft::new(format!("project {id}"), 10),
            )
            .unwrap();
            assert!(state.add_project(project));
        }
        state
    }

    fn day(d: u32) -> DayKey {
        DayKey::from_ymd(2024, 3, d).unwrap()
    }

    #[test]
    fn toggle_day_without_selection_is_noop() {
        let mut state = state_with(&["p1"]);
        assert_eq!(state.toggle_day(day(1)), None);
        assert!(state.allocations().is_empty());
    }

    #[test]
    fn selection_ignores_unknown_ids_and_toggles_off() {
        let mut state = state_with(&["p1"]);
        let p1 = ProjectId::from("p1");
        assert!(!state.select_project(Some(&ProjectId::from("ghost"))));
        assert!(state.selected_project().is_none());

        assert!(state.toggle_selection(&p1));
        assert_eq!(state.selected_project().map(|p| &p.id), Some(&p1));
        assert!(state.toggle_selection(&p1));
        assert!(state.selected_project().is_none());
    }

    #[test]
    fn delete_project_purges_and_clears_selection() {
        let mut state = state_with(&["p1", "p2"]);
        let p1 = ProjectId::from("p1");
        let p2 = ProjectId::from("p2");
        state.select_project(Some(&p1));
        assert_eq!(state.toggle_day(day(1)), Some(ToggleOutcome::Assigned));
        state.select_project(Some(&p2));
        state.toggle_day(day(1));
        state.select_project(Some(&p1));

        let removal = state.delete_project(&p1).unwrap();
        assert_eq!(removal.purged_allocations, 1);
        assert!(removal.selection_cleared);
        assert!(state.selected_project().is_none());
        assert_eq!(state.hours_used(&p1), 0);
        assert_eq!(state.hours_used(&p2), 6);
        assert!(state.delete_project(&p1).is_none());
    }

    #[test]
    fn delete_other_project_keeps_selection() {
        let mut state = state_with(&["p1", "p2"]);
        let p1 = ProjectId::from("p1");
        state.select_project(Some(&p1));
        let removal = state.delete_project(&ProjectId::from("p2")).unwrap();
        assert!(!removal.selection_cleared);
        assert_eq!(state.selected_project().map(|p| &p.id), Some(&p1));
    }

    #[test]
    fn add_project_rejects_duplicate_id() {
        let mut state = state_with(&["p1"]);
        let duplicate =
            Project::from_draft_with_id(ProjectId::from("p1"), &ProjectDraft::new("again", 5))
                .unwrap();
        assert!(!state.add_project(duplicate));
        assert_eq!(state.projects().len(), 1);
    }

    #[test]
    fn month_navigation_moves_cursor() {
        let mut state = state_with(&[]);
        assert_eq!(state.next_month(), MonthCursor::new(2024, 4).unwrap());
        state.previous_month();
        state.previous_month();
        assert_eq!(state.visible_month(), MonthCursor::new(2024, 2).unwrap());
    }

    #[test]
    fn percent_used_uses_project_budget() {
        let mut state = state_with(&["p1"]);
        let p1 = ProjectId::from("p1");
        state.select_project(Some(&p1));
        state.toggle_day(day(1));
        assert_eq!(state.percent_used(&p1), 60);
        assert_eq!(state.percent_used(&ProjectId::from("ghost")), 0);
    }
}
