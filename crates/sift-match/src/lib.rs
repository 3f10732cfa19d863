//! Typo-tolerant fuzzy text matching with deterministic, rank-stable scoring.
//!
//! This crate is the pure matching half of the sift workspace:
//! - [`FuzzyMatcher`] — the three-phase scoring engine
//! - [`MatchResult`] — score plus matched character indices
//! - [`MatcherConfig`] / [`ScoringWeights`] — tuning knobs
//! - [`CaseMatching`] — case-sensitivity policy
//!
//! # Phases
//!
//! A query is evaluated against a candidate text in three phases; the first
//! phase that succeeds wins:
//! 1. Exact substring — score is exactly `1.0`, so exact matches always
//!    outrank fuzzy ones under any score-ordered sort.
//! 2. Ordered subsequence — all query characters appear in order, gaps
//!    allowed; score in `(0.01, 0.99)`.
//! 3. Bounded edit distance — Levenshtein capped at a configured maximum,
//!    guarded by cheap lower bounds; score in `(0.01, 0.59)`.
//!
//! The matcher is total over its input domain: it returns `None` for
//! "no match" and never errors.

#![forbid(unsafe_code)]

mod config;
mod distance;
mod matcher;
mod normalize;

pub use config::{CaseMatching, MatcherConfig, ScoringWeights};
pub use distance::{bounded_levenshtein, distance_lower_bound};
pub use matcher::{FuzzyMatcher, MatchResult};
pub use normalize::fold;
