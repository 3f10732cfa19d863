//! Umbrella crate: re-exports the matcher (`sift-match`) and the search
//! controller (`sift-core`) behind one dependency.
//!
//! Most hosts only need [`SearchController`] plus [`ItemAccessors`] and
//! [`SearchConfig`]; reach into [`match_core`] for standalone matching.

#![forbid(unsafe_code)]

pub use sift_core::{
    Cursor, DebounceTimer, Error, Group, ItemAccessors, LoadCompletion, LoadRequest, LoadedPage,
    PageLoader, RequestId, Result, SearchConfig, SearchController, SearchPhase, SearchState,
    SearchSubscriber, Selection, SubscriptionId, TriggerMode,
};
pub use sift_match::{CaseMatching, FuzzyMatcher, MatchResult, MatcherConfig, ScoringWeights};

/// The full matcher crate, for hosts that only need scoring.
pub use sift_match as match_core;

/// The full controller crate, for access beyond the common re-exports.
pub use sift_core as search_core;
