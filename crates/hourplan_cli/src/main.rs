//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `hourplan_core` linkage with a deterministic version line.
//! - Print the project usage table of a planner database when a path is given.

use hourplan_core::db::open_db;
use hourplan_core::{PlannerService, SqliteKvRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("hourplan_core version={}", hourplan_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open planner database `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let service = PlannerService::open(SqliteKvRepository::new(&conn));
    let state = service.state();

    println!(
        "projects={} allocated_days={}",
        state.projects().len(),
        state.allocations().len()
    );
    for (project, usage) in state.projects().iter().zip(service.usage_summary()) {
        println!(
            "{}\t{}\t{}/{}h\t{}%",
            project.id, project.name, usage.hours_used, usage.total_hours, usage.percent_used
        );
    }
    ExitCode::SUCCESS
}
