//! The three-phase fuzzy matcher.
//!
//! [`FuzzyMatcher::match_text`] evaluates phases in order — exact substring,
//! ordered subsequence, bounded edit distance — and returns the first hit.
//! Scoring is deterministic: the same query/text pair always produces the
//! same score, and the phase ranges are disjoint enough that exact matches
//! (`1.0`) always outrank subsequence matches (`< 0.99`), which in turn can
//! never be undercut by an accidental edit-distance inflation (`< 0.59`).

use crate::config::MatcherConfig;
use crate::distance::{bounded_levenshtein, distance_lower_bound};
use crate::normalize::{fold, is_word_boundary};

/// Floor added to every subsequence score so it stays strictly above 0.01.
const SUBSEQUENCE_FLOOR: f64 = 0.02;
/// Scale applied to the weighted subsequence blend; floor + scale < 0.99.
const SUBSEQUENCE_SCALE: f64 = 0.96;
/// Ceiling of the edit-distance score band, strictly below 0.59.
const EDIT_DISTANCE_CEILING: f64 = 0.58;

/// A successful match: confidence score plus matched character positions.
///
/// `indices` are character positions into the NFC-normalized text. They are
/// contiguous for substring matches, sparse for subsequence matches, and
/// empty for edit-distance matches (where per-character attribution is not
/// meaningful).
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Confidence in `[0, 1]`; exactly `1.0` only for exact substring hits.
    pub score: f64,
    /// Matched character indices, ascending.
    pub indices: Vec<usize>,
}

/// Pure, reentrant three-phase matcher. Holds configuration only; no shared
/// state, safe to call from anywhere.
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    config: MatcherConfig,
}

impl FuzzyMatcher {
    /// Create a matcher with the given configuration.
    #[must_use]
    pub const fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match `query` against `text`.
    ///
    /// Returns `None` when no phase produces a match. An empty query matches
    /// everything with score `1.0` and no indices.
    #[must_use]
    pub fn match_text(&self, query: &str, text: &str) -> Option<MatchResult> {
        let sensitive = self.config.case_matching.is_sensitive_for(query);
        let q = fold(query, sensitive);
        if q.is_empty() {
            return Some(MatchResult {
                score: 1.0,
                indices: Vec::new(),
            });
        }
        let t = fold(text, sensitive);

        if let Some(result) = exact_substring(&q, &t) {
            return Some(result);
        }
        if let Some(result) = self.ordered_subsequence(&q, &t) {
            return Some(result);
        }
        self.bounded_edit_distance(&q, &t)
    }

    /// Match `query` against several fields, returning the best result and
    /// the index of the field that produced it. Ties go to the earlier field.
    #[must_use]
    pub fn match_fields<S: AsRef<str>>(
        &self,
        query: &str,
        fields: &[S],
    ) -> Option<(usize, MatchResult)> {
        let mut best: Option<(usize, MatchResult)> = None;
        for (idx, field) in fields.iter().enumerate() {
            if let Some(result) = self.match_text(query, field.as_ref()) {
                let better = best
                    .as_ref()
                    .is_none_or(|(_, current)| result.score > current.score);
                if better {
                    best = Some((idx, result));
                }
            }
        }
        best
    }

    /// Phase 2: all query characters appear in `text` in order, gaps allowed.
    ///
    /// Single forward scan, O(|text| + |query|). The score blends coverage
    /// density, the longest consecutive run, start position, and word
    /// boundary alignment per the configured weights.
    fn ordered_subsequence(&self, q: &[char], t: &[char]) -> Option<MatchResult> {
        if q.len() > t.len() {
            return None;
        }

        let mut indices = Vec::with_capacity(q.len());
        let mut ti = 0usize;
        for &qc in q {
            let found = t[ti..].iter().position(|&tc| tc == qc)?;
            indices.push(ti + found);
            ti += found + 1;
        }

        let mut longest_run = 1usize;
        let mut run = 1usize;
        let mut boundary_hits = usize::from(is_word_boundary(t, indices[0]));
        for w in indices.windows(2) {
            if w[1] == w[0] + 1 {
                run += 1;
                longest_run = longest_run.max(run);
            } else {
                run = 1;
            }
            if is_word_boundary(t, w[1]) {
                boundary_hits += 1;
            }
        }

        let m = q.len() as f64;
        let n = t.len() as f64;
        let weights = self.config.weights;
        let density = m / n;
        let run_component = longest_run as f64 / m;
        let position = 1.0 - indices[0] as f64 / n;
        let boundary = boundary_hits as f64 / m;

        let weighted = (weights.density * density
            + weights.consecutive_run * run_component
            + weights.position * position
            + weights.word_boundary * boundary)
            / weights.total();
        let score = SUBSEQUENCE_SCALE.mul_add(weighted, SUBSEQUENCE_FLOOR);

        Some(MatchResult { score, indices })
    }

    /// Phase 3: bounded Levenshtein, only reached when phases 1–2 fail.
    ///
    /// The lower-bound guard rejects clearly unrelated pairs before the
    /// quadratic DP runs.
    fn bounded_edit_distance(&self, q: &[char], t: &[char]) -> Option<MatchResult> {
        let max = self.config.max_edit_distance;
        if max == 0 {
            return None;
        }
        if distance_lower_bound(q, t) > max {
            return None;
        }
        let distance = bounded_levenshtein(q, t, max)?;
        debug_assert!(distance > 0, "zero distance should have hit phase 1");

        let score = EDIT_DISTANCE_CEILING * (1.0 - distance as f64 / (max as f64 + 1.0));
        Some(MatchResult {
            score,
            indices: Vec::new(),
        })
    }
}

/// Phase 1: contiguous substring under the active case policy.
fn exact_substring(q: &[char], t: &[char]) -> Option<MatchResult> {
    if q.len() > t.len() {
        return None;
    }
    let start = (0..=t.len() - q.len()).find(|&i| t[i..i + q.len()] == *q)?;
    Some(MatchResult {
        score: 1.0,
        indices: (start..start + q.len()).collect(),
    })
}
