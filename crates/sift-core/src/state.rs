//! Observable search state
//!
//! [`SearchState`] is the snapshot pushed to subscribers after every state
//! transition. It is a plain value: subscribers get a reference during
//! notification and clone what they need.

use serde::{Deserialize, Serialize};

use crate::arbiter::RequestId;
use crate::loader::Cursor;
use crate::results::Group;

/// Lifecycle phase of the current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// No search has been executed yet (or state was reset).
    #[default]
    Idle,
    /// A search was issued and its first page has not arrived.
    Searching,
    /// Results for the latest search are available.
    Loaded,
    /// The latest search failed; `error` carries the message and the
    /// previous results are retained.
    Error,
}

impl std::fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Searching => "searching",
            Self::Loaded => "loaded",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Snapshot of everything a view needs to render the current search.
#[derive(Debug, Clone)]
pub struct SearchState<T> {
    /// The query the current results answer.
    pub query: String,
    /// Lifecycle phase.
    pub phase: SearchPhase,
    /// Visible items in derived order, flattened across groups.
    pub results: Vec<T>,
    /// Visible items with group structure. A single `None`-keyed group when
    /// grouping is not configured.
    pub groups: Vec<Group<T>>,
    /// Backend-reported total match count, when known.
    pub total_known: Option<usize>,
    /// Whether a load (initial or pagination) is in flight.
    pub is_loading: bool,
    /// Failure message for the `Error` phase.
    pub error: Option<String>,
    /// Id of the request these results answer.
    pub active_request: RequestId,
    /// Whether more results can be revealed or fetched.
    pub has_more: bool,
}

impl<T> Default for SearchState<T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            phase: SearchPhase::Idle,
            results: Vec::new(),
            groups: Vec::new(),
            total_known: None,
            is_loading: false,
            error: None,
            active_request: RequestId::NONE,
            has_more: false,
        }
    }
}

/// Pagination bookkeeping for the active query.
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Continuation position for the next page, if any.
    pub cursor: Option<Cursor>,
    /// Whether another page exists.
    pub has_more: bool,
}

impl PaginationState {
    /// Reset to the pre-first-page state.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.has_more = false;
    }
}
