//! Debounce timer
//!
//! Single-shot, cancellable delayed trigger. The controller arms it on every
//! query edit and the host's event loop drives it through
//! [`SearchController::tick_at`](crate::controller::SearchController::tick_at);
//! re-arming unconditionally replaces any pending deadline, so a superseded
//! timer can never fire. Deadlines are explicit [`Instant`]s, which keeps
//! tests deterministic without sleeping.

use std::time::{Duration, Instant};

/// Deadline-based single-shot timer.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    deadline: Option<Instant>,
}

impl DebounceTimer {
    /// Create an unarmed timer.
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm (or re-arm) the timer to fire `delay` after `now`. Any previous
    /// deadline is discarded.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Cancel unconditionally.
    pub const fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is pending.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire if the deadline has passed. Returns `true` at most once per arm:
    /// firing disarms the timer.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
