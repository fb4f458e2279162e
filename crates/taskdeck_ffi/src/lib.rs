//! Synchronous use-case API for UI shells.

pub mod api;
