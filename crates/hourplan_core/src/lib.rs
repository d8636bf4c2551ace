//! Core domain logic for the hour-budget planner.
//! This crate is the single source of truth for allocation and usage rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod usage;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::allocation::{
    Allocation, AllocationError, MAX_PROJECTS_PER_DAY, SHARED_DAY_HOURS, SOLO_DAY_HOURS,
};
pub use model::calendar::{DayKey, DayKeyParseError, MonthCursor, WEEKDAY_LABELS};
pub use model::planner::{PlannerState, ProjectRemoval};
pub use model::project::{
    Project, ProjectDraft, ProjectId, ProjectValidationError, DEFAULT_PROJECT_COLOR,
};
pub use repo::kv_repo::{
    KvRepository, MemoryKvRepository, RepoError, RepoResult, SqliteKvRepository,
};
pub use repo::snapshot::{AllocationSnapshot, LoadedSnapshot, SnapshotError};
pub use service::calendar_view::{DayCell, DayEntry, MonthView};
pub use service::planner_service::PlannerService;
pub use store::allocation_store::{AllocationStore, ToggleOutcome};
pub use usage::{hours_used, percent_used, ProjectUsage};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
