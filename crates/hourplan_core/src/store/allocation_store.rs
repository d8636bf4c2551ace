//! In-memory day allocation store.
//!
//! # Responsibility
//! - Own the day -> project(s) assignments of one planning session.
//! - Apply calendar click, remove, and project purge edits.
//!
//! # Invariants
//! - At most one allocation per date.
//! - No stored allocation is empty; the last removal deletes it.
//! - No allocation holds more than `MAX_PROJECTS_PER_DAY` ids.
//! - The first-assigned project stays at index 0 while the other toggles.

use crate::model::allocation::{Allocation, MAX_PROJECTS_PER_DAY};
use crate::model::calendar::DayKey;
use crate::model::project::ProjectId;
use log::warn;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Result of one calendar-day toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// New allocation created for an empty day.
    Assigned,
    /// Project joined a day that had one other project.
    Shared,
    /// Project left a shared day; the other project keeps it.
    Unassigned,
    /// Project was the only one; the allocation was deleted.
    Cleared,
    /// Day already holds two other projects; nothing changed.
    DayFull,
}

impl ToggleOutcome {
    /// Whether the store content changed.
    pub fn is_change(self) -> bool {
        !matches!(self, Self::DayFull)
    }
}

/// Allocation collection keyed by calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationStore {
    by_date: BTreeMap<DayKey, Allocation>,
}

impl AllocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already-valid allocations.
    ///
    /// A repeated date keeps its first allocation.
    pub fn from_allocations(allocations: impl IntoIterator<Item = Allocation>) -> Self {
        let mut by_date = BTreeMap::new();
        for allocation in allocations {
            match by_date.entry(allocation.date()) {
                Entry::Vacant(slot) => {
                    slot.insert(allocation);
                }
                Entry::Occupied(slot) => {
                    warn!(
                        "event=allocation_duplicate_date module=store status=skipped date={}",
                        slot.key()
                    );
                }
            }
        }
        Self { by_date }
    }

    /// Toggles `project_id` on `date`.
    ///
    /// # Contract
    /// - Empty day: creates `[project_id]`.
    /// - Day containing `project_id`: removes it, deleting the day when empty.
    /// - Day with one other project: appends `project_id` in slot 1.
    /// - Day with two other projects: no-op, returns `DayFull`.
    pub fn toggle(&mut self, date: DayKey, project_id: &ProjectId) -> ToggleOutcome {
        let mut slot = match self.by_date.entry(date) {
            Entry::Vacant(slot) => {
                slot.insert(Allocation::solo(date, project_id.clone()));
                return ToggleOutcome::Assigned;
            }
            Entry::Occupied(slot) => slot,
        };

        let allocation = slot.get_mut();
        if allocation.remove(project_id) {
            if allocation.is_empty() {
                slot.remove();
                return ToggleOutcome::Cleared;
            }
            return ToggleOutcome::Unassigned;
        }

        if allocation.project_ids().len() >= MAX_PROJECTS_PER_DAY {
            return ToggleOutcome::DayFull;
        }
        allocation.push(project_id.clone());
        ToggleOutcome::Shared
    }

    /// Removes `project_id` from `date` if present.
    ///
    /// Idempotent; returns whether anything changed.
    pub fn remove(&mut self, date: DayKey, project_id: &ProjectId) -> bool {
        let Entry::Occupied(mut slot) = self.by_date.entry(date) else {
            return false;
        };
        if !slot.get_mut().remove(project_id) {
            return false;
        }
        if slot.get().is_empty() {
            slot.remove();
        }
        true
    }

    /// Removes `project_id` from every day and drops days left empty.
    ///
    /// Returns the number of allocations that referenced the project.
    pub fn purge(&mut self, project_id: &ProjectId) -> usize {
        let mut touched = 0;
        self.by_date.retain(|_, allocation| {
            if allocation.remove(project_id) {
                touched += 1;
            }
            !allocation.is_empty()
        });
        touched
    }

    pub fn lookup(&self, date: DayKey) -> Option<&Allocation> {
        self.by_date.get(&date)
    }

    /// Allocations in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = &Allocation> {
        self.by_date.values()
    }

    /// Allocations that include `project_id`.
    pub fn for_project<'a>(
        &'a self,
        project_id: &'a ProjectId,
    ) -> impl Iterator<Item = &'a Allocation> + 'a {
        self.by_date
            .values()
            .filter(move |allocation| allocation.contains(project_id))
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Owned copy in date order, used for full-snapshot persistence.
    pub fn to_vec(&self) -> Vec<Allocation> {
        self.by_date.values().cloned().collect()
    }
}
