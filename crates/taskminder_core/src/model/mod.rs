//! Domain model for owner-scoped tasks with deadlines.
//!
//! # Invariants
//! - Every task is identified by a store-assigned `TaskId` that is never reused.
//! - Deadlines carry minute precision only.
//! - Deletion is a hard removal; there are no tombstones.

pub mod task;
