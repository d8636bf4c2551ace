//! Flutter-facing bindings for the hour-budget planner core.

pub mod api;
