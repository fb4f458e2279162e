//! Core use-case services.
//!
//! # Responsibility
//! - Own the task collection and its mutation rules (`task_engine`).
//! - Derive the filtered/sorted read model (`view`).
//! - Translate presentation commands into engine calls (`command`).

pub mod command;
pub mod task_engine;
pub mod view;
