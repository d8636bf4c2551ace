//! Calendar grid projection for the rendering layer.
//!
//! # Responsibility
//! - Flatten planner state into one cell per day of the visible month.
//! - Resolve project ids to display names and colors.
//!
//! # Invariants
//! - Cells are in day order, preceded by `leading_blanks` empty slots in a
//!   Sunday-first grid.
//! - Entries keep allocation slot order; unresolved ids are omitted.

use crate::model::calendar::{DayKey, MonthCursor, WEEKDAY_LABELS};
use crate::model::planner::PlannerState;
use crate::model::project::ProjectId;

/// One project shown on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry {
    pub project_id: ProjectId,
    pub name: String,
    pub color: String,
    pub hours: u32,
}

/// One calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: DayKey,
    pub day: u32,
    pub entries: Vec<DayEntry>,
    /// Day already holds the maximum number of projects.
    pub is_full: bool,
}

/// Visible month ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub month: MonthCursor,
    pub label: String,
    pub weekday_labels: [&'static str; 7],
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
    /// Day clicks have an effect only while a project is selected.
    pub selectable: bool,
}

pub fn build_month_view(state: &PlannerState) -> MonthView {
    let month = state.visible_month();
    let days = month
        .days()
        .map(|date| build_day_cell(state, date))
        .collect();

    MonthView {
        month,
        label: month.label(),
        weekday_labels: WEEKDAY_LABELS,
        leading_blanks: month.leading_blanks(),
        days,
        selectable: state.selected_project().is_some(),
    }
}

fn build_day_cell(state: &PlannerState, date: DayKey) -> DayCell {
    let Some(allocation) = state.allocations().lookup(date) else {
        return DayCell {
            date,
            day: date.day(),
            entries: Vec::new(),
            is_full: false,
        };
    };

    let hours = allocation.hours_per_project();
    let entries = allocation
        .project_ids()
        .iter()
        .filter_map(|project_id| state.project(project_id))
        .map(|project| DayEntry {
            project_id: project.id.clone(),
            name: project.name.clone(),
            color: project.color.clone(),
            hours,
        })
        .collect();

    DayCell {
        date,
        day: date.day(),
        entries,
        is_full: allocation.is_shared(),
    }
}
