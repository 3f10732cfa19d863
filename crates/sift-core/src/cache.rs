//! Derived-result cache
//!
//! [`ResultCache`] memoizes computed result pages for the offline pipeline:
//! - [`CacheKey`] — (query, filter identity + version, sort identity)
//! - bounded capacity with least-recently-used eviction
//! - [`bump_version`](ResultCache::bump_version) — re-registering a predicate
//!   under an existing name bumps that name's version, so future keys differ
//!   and stale entries are orphaned with no active invalidation sweep
//! - [`CacheStats`] — hit/miss/eviction counters
//!
//! The query component is stored verbatim (the controller caches exactly the
//! query it executed); filter identity is the sorted list of
//! `(name, version)` pairs so registration order never splits keys.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default maximum cache entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Deterministic cache key for a derived result page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    /// Sorted `(filter name, filter version)` pairs.
    filters: Vec<(String, u64)>,
    sort_identity: Option<String>,
}

/// Cache hit/miss/eviction counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total cache hits.
    pub hits: u64,
    /// Total cache misses.
    pub misses: u64,
    /// Total capacity evictions.
    pub evictions: u64,
    /// Total entries inserted.
    pub inserts: u64,
    /// Current entry count.
    pub entries: usize,
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    last_used: u64,
}

/// Bounded LRU cache keyed by query/filter/sort identity, with a per-filter
/// version registry.
#[derive(Debug)]
pub struct ResultCache<V> {
    max_entries: usize,
    entries: HashMap<CacheKey, CacheEntry<V>>,
    versions: HashMap<String, u64>,
    clock: u64,
    stats: CacheStats,
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl<V> ResultCache<V> {
    /// Create a cache holding at most `max_entries` values. A capacity of
    /// zero disables caching entirely (every `get` misses, `put` is a no-op).
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: HashMap::new(),
            versions: HashMap::new(),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    /// Build the key for `query` under the current filter versions.
    ///
    /// `filter_names` is the set of active filter names; the key embeds each
    /// name with its current version, sorted by name.
    #[must_use]
    pub fn key_for<'a, I>(&self, query: &str, filter_names: I, sort_identity: Option<&str>) -> CacheKey
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut filters: Vec<(String, u64)> = filter_names
            .into_iter()
            .map(|name| {
                let version = self.versions.get(name).copied().unwrap_or(0);
                (name.to_owned(), version)
            })
            .collect();
        filters.sort();
        CacheKey {
            query: query.to_owned(),
            filters,
            sort_identity: sort_identity.map(str::to_owned),
        }
    }

    /// Increment the version component of future keys for `filter_name`,
    /// implicitly orphaning entries built against older versions.
    pub fn bump_version(&mut self, filter_name: &str) {
        let version = self.versions.entry(filter_name.to_owned()).or_insert(0);
        *version += 1;
        tracing::debug!(filter = filter_name, version = *version, "filter version bumped");
    }

    /// Current version for `filter_name` (zero if never bumped).
    #[must_use]
    pub fn version_of(&self, filter_name: &str) -> u64 {
        self.versions.get(filter_name).copied().unwrap_or(0)
    }

    /// Look up a memoized value, refreshing its recency on hit.
    pub fn get(&mut self, key: &CacheKey) -> Option<V>
    where
        V: Clone,
    {
        self.clock += 1;
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_used = self.clock;
                self.stats.hits += 1;
                tracing::trace!(query = %key.query, "cache hit");
                Some(entry.value.clone())
            }
            None => {
                self.stats.misses += 1;
                tracing::trace!(query = %key.query, "cache miss");
                None
            }
        }
    }

    /// Insert a value, evicting the least recently used entry at capacity.
    pub fn put(&mut self, key: CacheKey, value: V) {
        if self.max_entries == 0 {
            return;
        }
        self.clock += 1;
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.evict_lru();
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                last_used: self.clock,
            },
        );
        self.stats.inserts += 1;
        self.stats.entries = self.entries.len();
    }

    /// Drop all entries. Filter versions are retained: they describe
    /// predicate identity, not cached data.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.entries = 0;
    }

    /// Counter snapshot.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_lru(&mut self) {
        let lru_key = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(k, _)| k.clone());
        if let Some(key) = lru_key {
            self.entries.remove(&key);
            self.stats.evictions += 1;
            tracing::debug!(query = %key.query, "cache entry evicted");
        }
    }
}
