//! Domain model for the task collection.
//!
//! # Responsibility
//! - Define the canonical `Task` record and its validation rules.
//! - Provide injectable id generation and clock seams for the engine.
//! - Normalize user-entered due dates into UTC instants.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` unique in its collection.
//! - Stored task text is trimmed and never empty.

pub mod clock;
pub mod datetime;
pub mod id;
pub mod task;
