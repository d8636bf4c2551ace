//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value storage contract used for planner snapshots.
//! - Own the JSON snapshot shapes, including legacy allocation migration.
//!
//! # Invariants
//! - Every write replaces a whole collection.
//! - Reads degrade to empty collections instead of surfacing errors.

pub mod kv_repo;
pub mod snapshot;
