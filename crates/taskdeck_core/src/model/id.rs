//! Task id generation.
//!
//! Generators only propose ids; the engine checks every candidate against
//! the live collection before assigning it.

use crate::model::task::TaskId;
use uuid::Uuid;

/// Source of candidate task ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> TaskId;
}

/// Random v4 UUID ids. Default for production engines.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> TaskId {
        TaskId::new(Uuid::new_v4().to_string())
    }
}

/// Deterministic `prefix-N` ids counting up from 1.
#[derive(Debug, Clone)]
pub struct MonotonicIdGenerator {
    prefix: String,
    next: u64,
}

impl MonotonicIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Returns the counter value the next call will use.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for MonotonicIdGenerator {
    fn default() -> Self {
        Self::new("task")
    }
}

impl IdGenerator for MonotonicIdGenerator {
    fn next_id(&mut self) -> TaskId {
        let value = self.next;
        self.next = self.next.wrapping_add(1);
        TaskId::new(format!("{}-{value}", self.prefix))
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> TaskId {
        (**self).next_id()
    }
}
