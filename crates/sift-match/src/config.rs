//! Matcher configuration
//!
//! [`MatcherConfig`] carries the case policy, the edit-distance cap for the
//! third matching phase, and the [`ScoringWeights`] used by the ordered
//! subsequence phase.

use serde::{Deserialize, Serialize};

/// Default cap on edit distance for the bounded-Levenshtein phase.
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 2;

/// Case-sensitivity policy applied before any phase runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseMatching {
    /// Compare characters exactly as written.
    Sensitive,
    /// Case-fold both query and text.
    Insensitive,
    /// Sensitive only when the query contains an uppercase character.
    #[default]
    Smart,
}

impl CaseMatching {
    /// Whether comparison is case-sensitive for the given query.
    #[must_use]
    pub fn is_sensitive_for(self, query: &str) -> bool {
        match self {
            Self::Sensitive => true,
            Self::Insensitive => false,
            Self::Smart => query.chars().any(char::is_uppercase),
        }
    }
}

/// Weights blended into the ordered-subsequence score.
///
/// Each component is normalized to `[0, 1]` before weighting, and the
/// weighted sum is mapped into `(0.01, 0.99)` so no subsequence match can
/// ever reach the exact-substring score of `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Query length relative to text length (denser matches rank higher).
    pub density: f64,
    /// Longest consecutive run of matched characters.
    pub consecutive_run: f64,
    /// Earlier first-match position in the text.
    pub position: f64,
    /// Fraction of matched characters aligned to word boundaries.
    pub word_boundary: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            density: 0.35,
            consecutive_run: 0.30,
            position: 0.15,
            word_boundary: 0.20,
        }
    }
}

impl ScoringWeights {
    /// Sum of all weights, used to normalize the blend.
    #[must_use]
    pub fn total(self) -> f64 {
        self.density + self.consecutive_run + self.position + self.word_boundary
    }
}

/// Configuration for [`FuzzyMatcher`](crate::FuzzyMatcher).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Case-sensitivity policy.
    #[serde(default)]
    pub case_matching: CaseMatching,
    /// Maximum edit distance attempted in the bounded-Levenshtein phase.
    #[serde(default = "default_max_edit_distance")]
    pub max_edit_distance: usize,
    /// Subsequence scoring weights.
    #[serde(default)]
    pub weights: ScoringWeights,
}

const fn default_max_edit_distance() -> usize {
    DEFAULT_MAX_EDIT_DISTANCE
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            case_matching: CaseMatching::default(),
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
            weights: ScoringWeights::default(),
        }
    }
}

impl MatcherConfig {
    /// Set the case policy.
    #[must_use]
    pub const fn with_case_matching(mut self, case_matching: CaseMatching) -> Self {
        self.case_matching = case_matching;
        self
    }

    /// Set the edit-distance cap. Zero disables the third phase entirely.
    #[must_use]
    pub const fn with_max_edit_distance(mut self, max: usize) -> Self {
        self.max_edit_distance = max;
        self
    }

    /// Set the subsequence scoring weights.
    #[must_use]
    pub const fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }
}
