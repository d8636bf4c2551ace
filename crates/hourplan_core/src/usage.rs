//! Project hour usage derived from allocations.
//!
//! # Responsibility
//! - Sum the hours a project consumes across all allocated days.
//! - Convert hours into a clamped budget percentage.
//!
//! # Invariants
//! - A solo day counts `SOLO_DAY_HOURS`, a shared day `SHARED_DAY_HOURS`.
//! - Results are a pure function of the allocation store; nothing is cached.
//! - Ids with no matching project are counted but never resolved to a budget.

use crate::model::project::{Project, ProjectId};
use crate::store::allocation_store::AllocationStore;

/// Budget consumption for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectUsage {
    pub project_id: ProjectId,
    pub hours_used: u32,
    pub total_hours: u32,
    pub percent_used: u32,
}

impl ProjectUsage {
    /// Hours left in the budget, zero once over budget.
    pub fn remaining_hours(&self) -> u32 {
        self.total_hours.saturating_sub(self.hours_used)
    }

    pub fn is_over_budget(&self) -> bool {
        self.hours_used > self.total_hours
    }
}

/// Total hours allocated to `project_id`.
pub fn hours_used(store: &AllocationStore, project_id: &ProjectId) -> u32 {
    store
        .for_project(project_id)
        .map(|allocation| allocation.hours_per_project())
        .sum()
}

/// `round(100 * hours_used / total_hours)` clamped to `0..=100`.
///
/// A non-positive budget yields 0. Halves round up.
pub fn percent_used(hours_used: u32, total_hours: u32) -> u32 {
    if total_hours == 0 {
        return 0;
    }
    let hours = u64::from(hours_used);
    let total = u64::from(total_hours);
    let rounded = (200 * hours + total) / (2 * total);
    rounded.min(100) as u32
}

/// Usage for one known project.
pub fn project_usage(store: &AllocationStore, project: &Project) -> ProjectUsage {
    let hours_used = hours_used(store, &project.id);
    ProjectUsage {
        project_id: project.id.clone(),
        hours_used,
        total_hours: project.total_hours,
        percent_used: percent_used(hours_used, project.total_hours),
    }
}

/// Usage rows in project-list order.
pub fn usage_summary(store: &AllocationStore, projects: &[Project]) -> Vec<ProjectUsage> {
    projects
        .iter()
        .map(|project| project_usage(store, project))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{hours_used, percent_used, project_usage};
    use crate::model::calendar::DayKey;
    use crate::model::project::{Project, ProjectDraft, ProjectId};
    use crate::store::allocation_store::AllocationStore;

    fn day(d: u32) -> DayKey {
        DayKey::from_ymd(2024, 3, d).unwrap()
    }

    #[test]
    fn solo_days_count_six_and_shared_days_three() {
        let mut store = AllocationStore::new();
        let p1 = ProjectId::from("p1");
        let p2 = ProjectId::from("p2");
        store.toggle(day(1), &p1);
        store.toggle(day(2), &p1);
        store.toggle(day(2), &p2);

        assert_eq!(hours_used(&store, &p1), 9);
        assert_eq!(hours_used(&store, &p2), 3);
        assert_eq!(hours_used(&store, &ProjectId::from("none")), 0);
    }

    #[test]
    fn percent_rounds_and_clamps() {
        assert_eq!(percent_used(7, 10), 70);
        assert_eq!(percent_used(15, 10), 100);
        assert_eq!(percent_used(1, 3), 33);
        assert_eq!(percent_used(1, 8), 13);
        assert_eq!(percent_used(0, 40), 0);
        assert_eq!(percent_used(6, 0), 0);
    }

    #[test]
    fn project_usage_reports_remaining_hours() {
        let mut store = AllocationStore::new();
        let project =
            Project::from_draft_with_id(ProjectId::from("p1"), &ProjectDraft::new("A", 10))
                .unwrap();
        store.toggle(day(1), &project.id);
        store.toggle(day(2), &project.id);

        let usage = project_usage(&store, &project);
        assert_eq!(usage.hours_used, 12);
        assert_eq!(usage.percent_used, 100);
        assert_eq!(usage.remaining_hours(), 0);
        assert!(usage.is_over_budget());
    }
}
