//! In-memory planning stores.
//!
//! # Responsibility
//! - Hold mutable planning collections behind invariant-preserving APIs.
//! - Stay free of I/O; persistence lives in `repo`.

pub mod allocation_store;
