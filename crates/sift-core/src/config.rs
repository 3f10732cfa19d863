//! Controller configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sift_match::MatcherConfig;

use crate::cache::DEFAULT_CACHE_CAPACITY;

/// Default debounce delay for edit-triggered searches.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Default page size for pagination and reveal windows.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default minimum score for fuzzy inclusion in the offline pipeline.
pub const DEFAULT_FUZZY_MIN_SCORE: f64 = 0.01;

/// When a search executes relative to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Every edit (re)arms the debounce timer; the search runs when it fires.
    #[default]
    OnEdit,
    /// Edits only record the pending query; nothing runs until `submit`.
    OnSubmit,
}

/// Tunables for a [`SearchController`](crate::controller::SearchController).
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Search trigger policy.
    pub trigger: TriggerMode,
    /// Debounce delay applied in [`TriggerMode::OnEdit`].
    pub debounce_delay: Duration,
    /// Page size for loads and offline reveal windows.
    pub page_size: usize,
    /// Result cache capacity; zero disables caching.
    pub cache_capacity: usize,
    /// Matcher configuration for the offline pipeline.
    pub matcher: MatcherConfig,
    /// Minimum score for an item to be included by the offline pipeline.
    /// `None` restricts inclusion to exact substring matches (score `1.0`).
    pub fuzzy_min_score: Option<f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerMode::OnEdit,
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
            page_size: DEFAULT_PAGE_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            matcher: MatcherConfig::default(),
            fuzzy_min_score: Some(DEFAULT_FUZZY_MIN_SCORE),
        }
    }
}

impl SearchConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trigger policy.
    #[must_use]
    pub const fn with_trigger(mut self, trigger: TriggerMode) -> Self {
        self.trigger = trigger;
        self
    }

    /// Set the debounce delay.
    #[must_use]
    pub const fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the result cache capacity.
    #[must_use]
    pub const fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the matcher configuration.
    #[must_use]
    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Self {
        self.matcher = matcher;
        self
    }

    /// Set the minimum fuzzy-inclusion score, or `None` for exact-only.
    #[must_use]
    pub const fn with_fuzzy_min_score(mut self, min_score: Option<f64>) -> Self {
        self.fuzzy_min_score = min_score;
        self
    }
}
