//! Planner use-case service.
//!
//! # Responsibility
//! - Load the planner state once per session and own it exclusively.
//! - Run each use case against the state, then write the touched
//!   collections through to the repository.
//!
//! # Invariants
//! - In-memory state is committed before persistence is attempted.
//! - A failed write is logged and recorded, never rolled back or retried.
//! - Rejected input and no-op clicks do not touch storage.

use crate::model::calendar::{DayKey, MonthCursor};
use crate::model::planner::{PlannerState, ProjectRemoval};
use crate::model::project::{Project, ProjectDraft, ProjectId};
use crate::repo::kv_repo::KvRepository;
use crate::repo::snapshot::{load_snapshot, save_allocations, save_projects};
use crate::service::calendar_view::{build_month_view, MonthView};
use crate::store::allocation_store::ToggleOutcome;
use crate::usage::ProjectUsage;
use log::{debug, info, warn};

/// Collections written after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Touched {
    Projects,
    Allocations,
    Both,
}

/// Planner facade over a key-value repository.
pub struct PlannerService<R: KvRepository> {
    repo: R,
    state: PlannerState,
    last_persist_error: Option<String>,
}

impl<R: KvRepository> PlannerService<R> {
    /// Loads persisted collections and shows the current local month.
    pub fn open(repo: R) -> Self {
        Self::open_at(repo, MonthCursor::current())
    }

    /// Loads persisted collections and shows `month`.
    ///
    /// A migrated legacy allocation blob is rewritten in the current shape
    /// right away.
    pub fn open_at(repo: R, month: MonthCursor) -> Self {
        let loaded = load_snapshot(&repo);
        let migrated = loaded.migrated_legacy;
        let mut service = Self {
            repo,
            state: PlannerState::new(loaded.projects, loaded.allocations, month),
            last_persist_error: None,
        };
        if migrated {
            service.persist(Touched::Allocations);
        }
        service
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Message of the most recent failed write, cleared by the next success.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Creates a project from form input.
    ///
    /// Invalid drafts are dropped without creating a record; returns `None`.
    pub fn add_project(&mut self, draft: &ProjectDraft) -> Option<ProjectId> {
        let project = match Project::from_draft(draft) {
            Ok(project) => project,
            Err(err) => {
                debug!("event=project_add module=service status=rejected reason={err}");
                return None;
            }
        };
        let project_id = project.id.clone();
        if !self.state.add_project(project) {
            return None;
        }
        info!("event=project_add module=service status=ok project_id={project_id}");
        self.persist(Touched::Projects);
        Some(project_id)
    }

    /// Deletes a project, purges its allocations, and clears a matching
    /// selection.
    pub fn delete_project(&mut self, project_id: &ProjectId) -> Option<ProjectRemoval> {
        let removal = self.state.delete_project(project_id)?;
        info!(
            "event=project_delete module=service status=ok project_id={project_id} purged_allocations={} selection_cleared={}",
            removal.purged_allocations, removal.selection_cleared
        );
        self.persist(Touched::Both);
        Some(removal)
    }

    /// Sets or clears the selected project. Not persisted.
    pub fn select_project(&mut self, project_id: Option<&ProjectId>) -> bool {
        self.state.select_project(project_id)
    }

    /// Project-list click: select, or deselect when already selected.
    pub fn toggle_selection(&mut self, project_id: &ProjectId) -> bool {
        self.state.toggle_selection(project_id)
    }

    /// Calendar-day click using the selected project.
    pub fn day_click(&mut self, date: DayKey) -> Option<ToggleOutcome> {
        let outcome = self.state.toggle_day(date)?;
        debug!("event=day_toggle module=service date={date} outcome={outcome:?}");
        if outcome.is_change() {
            self.persist(Touched::Allocations);
        }
        Some(outcome)
    }

    /// Removes one project from one day. Idempotent.
    pub fn remove_allocation(&mut self, date: DayKey, project_id: &ProjectId) -> bool {
        let changed = self.state.remove_allocation(date, project_id);
        if changed {
            debug!("event=allocation_remove module=service date={date} project_id={project_id}");
            self.persist(Touched::Allocations);
        }
        changed
    }

    pub fn show_month(&mut self, month: MonthCursor) {
        self.state.show_month(month);
    }

    pub fn previous_month(&mut self) -> MonthCursor {
        self.state.previous_month()
    }

    pub fn next_month(&mut self) -> MonthCursor {
        self.state.next_month()
    }

    pub fn hours_used(&self, project_id: &ProjectId) -> u32 {
        self.state.hours_used(project_id)
    }

    pub fn percent_used(&self, project_id: &ProjectId) -> u32 {
        self.state.percent_used(project_id)
    }

    pub fn usage_summary(&self) -> Vec<ProjectUsage> {
        self.state.usage_summary()
    }

    /// Calendar projection of the visible month.
    pub fn month_view(&self) -> MonthView {
        build_month_view(&self.state)
    }

    fn persist(&mut self, touched: Touched) {
        let result = match touched {
            Touched::Projects => save_projects(&self.repo, self.state.projects()),
            Touched::Allocations => save_allocations(&self.repo, self.state.allocations()),
            Touched::Both => {
                let projects = save_projects(&self.repo, self.state.projects());
                let allocations = save_allocations(&self.repo, self.state.allocations());
                projects.and(allocations)
            }
        };
        match result {
            Ok(()) => self.last_persist_error = None,
            Err(err) => {
                warn!("event=snapshot_save module=service status=error touched={touched:?} error={err}");
                self.last_persist_error = Some(err.to_string());
            }
        }
    }
}
