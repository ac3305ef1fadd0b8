//! Trailing-edge debouncer driven by an external clock.
//!
//! The debouncer holds no timer of its own. Callers `poke` it with the
//! current instant, read [`Debouncer::deadline`] to know when to wake, and
//! call [`Debouncer::fire_if_due`] once they do. Each poke pushes the
//! deadline out by one window, so a burst of pokes fires once.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Arm (or re-arm) the debouncer at `now`.
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Pending deadline, if armed.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return true if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
