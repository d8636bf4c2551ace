//! Domain model for the hour-budget planner.
//!
//! # Responsibility
//! - Define projects, day allocations, calendar keys, and planner state.
//! - Keep every type serializable to the persisted JSON shape.
//!
//! # Invariants
//! - Projects are identified by an opaque, stable `ProjectId`.
//! - Deleting a project purges it from every allocation.

pub mod allocation;
pub mod calendar;
pub mod planner;
pub mod project;
