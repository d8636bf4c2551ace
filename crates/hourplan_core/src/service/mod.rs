//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate planner state changes and write-through persistence.
//! - Build display projections so UI/FFI layers stay storage-agnostic.

pub mod calendar_view;
pub mod planner_service;
