//! Request arbitration
//!
//! [`RequestArbiter`] issues strictly increasing request identifiers and
//! answers whether a given id is still the latest. Async completions tagged
//! with an older id are discarded by the controller, which is the entire
//! defense against out-of-order loads — no locks, no cancellation plumbing.

use serde::{Deserialize, Serialize};

/// Identifier for one search execution or page load. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    /// The id issued before any request; never current.
    pub const NONE: Self = Self(0);
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Monotonic id issuer. Thread-neutral: owned and called only from the
/// controller's single execution context.
#[derive(Debug, Default)]
pub struct RequestArbiter {
    last_issued: u64,
}

impl RequestArbiter {
    /// Create an arbiter with no ids issued yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_issued: 0 }
    }

    /// Issue the next id. Strictly increasing; never reused.
    pub const fn next_id(&mut self) -> RequestId {
        self.last_issued += 1;
        RequestId(self.last_issued)
    }

    /// Whether `id` is the most recently issued id.
    #[must_use]
    pub const fn is_current(&self, id: RequestId) -> bool {
        id.0 != 0 && id.0 == self.last_issued
    }

    /// Invalidate every outstanding id by advancing past them. Any in-flight
    /// completion becomes stale and will be dropped on arrival.
    pub const fn invalidate(&mut self) {
        self.last_issued += 1;
    }

    /// The most recently issued id, or [`RequestId::NONE`].
    #[must_use]
    pub const fn latest(&self) -> RequestId {
        RequestId(self.last_issued)
    }
}
