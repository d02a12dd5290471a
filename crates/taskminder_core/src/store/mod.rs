//! Task store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the owner-scoped CRUD contract shared by dispatcher and scheduler.
//! - Isolate SQLite query details behind [`TaskStore`].
//!
//! # Invariants
//! - Every store call is one atomic unit against the database.
//! - The connection is only touched while holding the store mutex.

pub mod task_store;
