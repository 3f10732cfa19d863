//! Error types for the controller

use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced synchronously by controller and loader plumbing.
///
/// Loader *failures* are not represented here: they flow into the
/// [`SearchPhase::Error`](crate::state::SearchPhase) state carried by the
/// snapshot instead, and stale completions are silently dropped. Only
/// contract violations are reported at the call site.
#[derive(Debug, Error)]
pub enum Error {
    /// The loader response violated the pagination contract
    /// (e.g. `has_more` without a `next_cursor`).
    #[error("Loader contract violation: {0}")]
    LoaderContract(String),

    /// The completion channel was torn down before the loader responded.
    /// Happens only when the controller was dropped outright; a disposed but
    /// live controller still accepts (and discards) completions.
    #[error("Completion channel closed")]
    ChannelClosed,
}

impl Error {
    /// Stable error type string (for structured logs and host bridges)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::LoaderContract(_) => "LOADER_CONTRACT",
            Self::ChannelClosed => "CHANNEL_CLOSED",
        }
    }

    /// Whether the error is transient and the operation can be retried
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ChannelClosed)
    }
}
