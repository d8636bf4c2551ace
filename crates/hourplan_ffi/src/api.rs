//! FFI use-case API for the planner UI shell.
//!
//! # Responsibility
//! - Expose stable, use-case-level planner functions to Dart via FRB.
//! - Map core results into flat, UI-ready response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Selected project and visible month are owned by the UI and passed in
//!   on every call; this layer keeps no planner state between calls.
//! - Every call loads the persisted snapshot, applies one use case, and lets
//!   the core service write it through.

use hourplan_core::db::open_db;
use hourplan_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, DayCell, DayKey,
    MonthCursor, MonthView, PlannerService, ProjectDraft, ProjectId, ProjectUsage,
    SqliteKvRepository, ToggleOutcome,
};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const PLANNER_DB_FILE_NAME: &str = "hourplan.sqlite3";
const PLANNER_DB_PATH_ENV: &str = "HOURPLAN_DB_PATH";
static PLANNER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the project list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    pub project_id: String,
    pub name: String,
    pub color: String,
    pub total_hours: u32,
    pub hours_used: u32,
    pub percent_used: u32,
    pub is_selected: bool,
}

/// One project chip inside a calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntryItem {
    pub project_id: String,
    pub name: String,
    pub color: String,
    pub hours: u32,
}

/// One calendar day cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayItem {
    /// `YYYY-MM-DD` key passed back on click/remove.
    pub date: String,
    pub day: u32,
    pub entries: Vec<DayEntryItem>,
    pub is_full: bool,
}

/// Full screen model returned by every planner call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerResponse {
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Selection after the call; cleared when its project was deleted.
    pub selected_project_id: Option<String>,
    pub year: i32,
    pub month: u32,
    pub month_label: String,
    pub weekday_labels: Vec<String>,
    pub leading_blanks: u32,
    pub days: Vec<DayItem>,
    pub projects: Vec<ProjectItem>,
}

impl PlannerResponse {
    fn failure(message: impl Into<String>, cursor: UiCursor) -> Self {
        Self {
            ok: false,
            message: message.into(),
            selected_project_id: cursor.selected_project_id,
            year: cursor.year,
            month: cursor.month,
            month_label: String::new(),
            weekday_labels: Vec::new(),
            leading_blanks: 0,
            days: Vec::new(),
            projects: Vec::new(),
        }
    }
}

/// Transient UI pointers supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UiCursor {
    selected_project_id: Option<String>,
    year: i32,
    month: u32,
}

impl UiCursor {
    fn new(selected_project_id: Option<String>, year: i32, month: u32) -> Self {
        Self {
            selected_project_id: selected_project_id.filter(|id| !id.trim().is_empty()),
            year,
            month,
        }
    }
}

/// Loads the planner screen for a month.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Invalid months fall back to the current local month.
/// - Unknown `selected_project_id` values are dropped.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_load(selected_project_id: Option<String>, year: i32, month: u32) -> PlannerResponse {
    let cursor = UiCursor::new(selected_project_id, year, month);
    run_at(&resolve_planner_db_path(), cursor, |_| Ok("Loaded.".to_string()))
}

/// Moves the visible month by `delta` whole months.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_shift_month(
    selected_project_id: Option<String>,
    year: i32,
    month: u32,
    delta: i32,
) -> PlannerResponse {
    let cursor = UiCursor::new(selected_project_id, year, month);
    run_at(&resolve_planner_db_path(), cursor, |service| {
        let month = service.state().visible_month().shift(delta);
        service.show_month(month);
        Ok(month.label())
    })
}

/// Creates a project from form input.
///
/// Invalid input (blank name, non-positive hours, bad color) is rejected
/// with `ok = false` and nothing is stored.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_add_project(
    name: String,
    total_hours: i64,
    color: Option<String>,
    selected_project_id: Option<String>,
    year: i32,
    month: u32,
) -> PlannerResponse {
    let cursor = UiCursor::new(selected_project_id, year, month);
    let mut draft = ProjectDraft::new(name, total_hours);
    if let Some(color) = color.filter(|color| !color.trim().is_empty()) {
        draft = draft.with_color(color);
    }
    run_at(&resolve_planner_db_path(), cursor, |service| {
        service
            .add_project(&draft)
            .map(|project_id| format!("Project {project_id} created."))
            .ok_or_else(|| "Project input rejected.".to_string())
    })
}

/// Deletes a project and purges it from every day.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_delete_project(
    project_id: String,
    selected_project_id: Option<String>,
    year: i32,
    month: u32,
) -> PlannerResponse {
    let cursor = UiCursor::new(selected_project_id, year, month);
    run_at(&resolve_planner_db_path(), cursor, |service| {
        service
            .delete_project(&ProjectId::from(project_id))
            .map(|removal| {
                format!(
                    "Project deleted; {} day(s) updated.",
                    removal.purged_allocations
                )
            })
            .ok_or_else(|| "Project not found.".to_string())
    })
}

/// Calendar-day click with the UI's selected project.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_day_click(
    date: String,
    selected_project_id: Option<String>,
    year: i32,
    month: u32,
) -> PlannerResponse {
    let cursor = UiCursor::new(selected_project_id, year, month);
    run_at(&resolve_planner_db_path(), cursor, |service| {
        let date = parse_date(&date)?;
        Ok(match service.day_click(date) {
            None => "Select a project first.".to_string(),
            Some(outcome) => toggle_message(outcome).to_string(),
        })
    })
}

/// Removes one project from one day (calendar remove button).
#[flutter_rust_bridge::frb(sync)]
pub fn planner_remove_allocation(
    date: String,
    project_id: String,
    selected_project_id: Option<String>,
    year: i32,
    month: u32,
) -> PlannerResponse {
    let cursor = UiCursor::new(selected_project_id, year, month);
    run_at(&resolve_planner_db_path(), cursor, |service| {
        let date = parse_date(&date)?;
        Ok(if service.remove_allocation(date, &ProjectId::from(project_id)) {
            "Allocation removed.".to_string()
        } else {
            "Nothing to remove.".to_string()
        })
    })
}

type Service<'conn> = PlannerService<SqliteKvRepository<'conn>>;

fn run_at(
    db_path: &Path,
    cursor: UiCursor,
    action: impl FnOnce(&mut Service<'_>) -> Result<String, String>,
) -> PlannerResponse {
    let conn = match open_db(db_path) {
        Ok(conn) => conn,
        Err(err) => {
            return PlannerResponse::failure(format!("planner DB open failed: {err}"), cursor)
        }
    };

    let month = MonthCursor::new(cursor.year, cursor.month).unwrap_or_else(MonthCursor::current);
    let mut service = PlannerService::open_at(SqliteKvRepository::new(&conn), month);
    if let Some(selected) = cursor.selected_project_id.as_deref() {
        service.select_project(Some(&ProjectId::from(selected)));
    }

    let (ok, mut message) = match action(&mut service) {
        Ok(message) => (true, message),
        Err(message) => (false, message),
    };
    if let Some(persist_error) = service.last_persist_error() {
        warn!("event=ffi_call module=ffi status=degraded error={persist_error}");
        message = format!("{message} (not saved: {persist_error})");
    }
    to_response(&service, ok, message)
}

fn to_response(service: &Service<'_>, ok: bool, message: String) -> PlannerResponse {
    let state = service.state();
    let selected = state.selected_project().map(|project| project.id.clone());
    let view = service.month_view();
    let projects = state
        .projects()
        .iter()
        .zip(service.usage_summary())
        .map(|(project, usage)| to_project_item(project, &usage, selected.as_ref()))
        .collect();

    let MonthView {
        month,
        label,
        weekday_labels,
        leading_blanks,
        days,
        ..
    } = view;
    PlannerResponse {
        ok,
        message,
        selected_project_id: selected.map(|id| id.to_string()),
        year: month.year(),
        month: month.month(),
        month_label: label,
        weekday_labels: weekday_labels.iter().map(|label| label.to_string()).collect(),
        leading_blanks,
        days: days.into_iter().map(to_day_item).collect(),
        projects,
    }
}

fn to_project_item(
    project: &hourplan_core::Project,
    usage: &ProjectUsage,
    selected: Option<&ProjectId>,
) -> ProjectItem {
    ProjectItem {
        project_id: project.id.to_string(),
        name: project.name.clone(),
        color: project.color.clone(),
        total_hours: project.total_hours,
        hours_used: usage.hours_used,
        percent_used: usage.percent_used,
        is_selected: selected == Some(&project.id),
    }
}

fn to_day_item(cell: DayCell) -> DayItem {
    DayItem {
        date: cell.date.to_string(),
        day: cell.day,
        entries: cell
            .entries
            .into_iter()
            .map(|entry| DayEntryItem {
                project_id: entry.project_id.to_string(),
                name: entry.name,
                color: entry.color,
                hours: entry.hours,
            })
            .collect(),
        is_full: cell.is_full,
    }
}

fn parse_date(raw: &str) -> Result<DayKey, String> {
    raw.parse::<DayKey>().map_err(|err| err.to_string())
}

fn toggle_message(outcome: ToggleOutcome) -> &'static str {
    match outcome {
        ToggleOutcome::Assigned => "Day assigned.",
        ToggleOutcome::Shared => "Day shared between two projects.",
        ToggleOutcome::Unassigned => "Project removed from shared day.",
        ToggleOutcome::Cleared => "Day cleared.",
        ToggleOutcome::DayFull => "Day already has two projects.",
    }
}

fn resolve_planner_db_path() -> PathBuf {
    PLANNER_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(PLANNER_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(PLANNER_DB_FILE_NAME)
        })
        .clone()
}
