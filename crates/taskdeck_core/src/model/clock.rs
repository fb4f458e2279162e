//! Clock seam for "now" and the local UTC offset.

use chrono::{DateTime, Duration, FixedOffset, Local};
use std::cell::Cell;
use std::rc::Rc;

/// Supplies the evaluation instant together with the local offset.
///
/// The offset decides calendar-day boundaries for "due today" and how
/// offset-less due date input is interpreted.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the process-local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Manually driven clock for deterministic tests and replays.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}
