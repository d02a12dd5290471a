//! Inbound request handling.
//!
//! # Responsibility
//! - Map transport-neutral requests onto task store calls.
//! - Render every outcome, including failures, as a user-facing reply.
//!
//! # Invariants
//! - The dispatcher never sets the reminded flag.
//! - No store error escapes as a panic or a process-level failure.

pub mod task_dispatcher;
