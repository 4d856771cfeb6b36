//! A single pending tick with cancellation.

use std::time::Instant;

/// Holds at most one pending tick.
///
/// Arming replaces whatever was pending, so two ticks can never be
/// outstanding at once.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    due: Option<Instant>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot for `due`, replacing any previous tick.
    pub fn arm(&mut self, due: Instant) {
        self.due = Some(due);
    }

    /// Cancel the pending tick. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.due.take().is_some()
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Fire the pending tick if it is due at `now`, disarming the slot.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
