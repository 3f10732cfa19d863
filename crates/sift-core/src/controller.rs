//! Search controller
//!
//! [`SearchController`] coordinates the whole search lifecycle around one
//! collection: debounced or submit-triggered queries, the offline derivation
//! pipeline (match, filter, group, sort, paginate) with memoization, async
//! page loads with request-id arbitration, identity-based multi-selection,
//! and subscriber notification.
//!
//! The controller is single-threaded and tick-driven. It never blocks: the
//! host event loop calls [`tick`](SearchController::tick) periodically, which
//! fires a due debounce deadline and drains loader completions. Loaders may
//! resolve from other threads; their completions cross back over an mpsc
//! channel and are applied on the controller's thread.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use indexmap::IndexMap;
use sift_match::FuzzyMatcher;

use crate::accessor::ItemAccessors;
use crate::arbiter::{RequestArbiter, RequestId};
use crate::cache::{CacheStats, ResultCache};
use crate::config::{SearchConfig, TriggerMode};
use crate::debounce::DebounceTimer;
use crate::loader::{Cursor, LoadCompletion, LoadEvent, LoadRequest, PageLoader};
use crate::results::{Group, ScoredEntry, flatten, group_and_sort, paginate, total_items};
use crate::selection::Selection;
use crate::state::{PaginationState, SearchPhase, SearchState};

/// Host-registered filter predicate.
pub type FilterPredicate<T> = Box<dyn Fn(&T) -> bool>;

/// Host-registered sort comparator.
pub type SortComparator<T> = Box<dyn Fn(&T, &T) -> Ordering>;

/// Observer of controller state transitions.
pub trait SearchSubscriber<T, K> {
    /// Called after every state transition with the fresh snapshot.
    fn on_state(&self, state: &SearchState<T>);

    /// Called after every selection change with the full selected set.
    fn on_selection(&self, _selected: &HashSet<K>) {}
}

/// Handle for removing a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Where the controller gets its items.
enum DataSource<T> {
    /// Controller-owned in-memory collection; full offline pipeline.
    OfflineOwned(Vec<T>),
    /// Query-aware paged loader; relevance is the loader's responsibility.
    AsyncOwned(Box<dyn PageLoader<T>>),
    /// Host-shared collection; re-derived on [`SearchController::refresh`].
    External(Rc<RefCell<Vec<T>>>),
}

/// Outstanding load bookkeeping. `cursor` is `None` for an initial page.
struct InFlight {
    cursor: Option<Cursor>,
}

/// Coordinator for search over one collection. `T` is the item type, `K` the
/// stable identity type selection is keyed by.
pub struct SearchController<T, K> {
    accessors: ItemAccessors<T, K>,
    config: SearchConfig,
    matcher: FuzzyMatcher,
    source: DataSource<T>,
    state: SearchState<T>,
    pagination: PaginationState,
    pending_query: String,
    filters: IndexMap<String, FilterPredicate<T>>,
    sort: Option<(String, SortComparator<T>)>,
    selection: Selection<K>,
    cache: ResultCache<Rc<Vec<Group<T>>>>,
    arbiter: RequestArbiter,
    debounce: DebounceTimer,
    subscribers: Vec<(SubscriptionId, Rc<dyn SearchSubscriber<T, K>>)>,
    next_subscription: u64,
    completion_tx: Sender<LoadEvent<T>>,
    completion_rx: Receiver<LoadEvent<T>>,
    in_flight: Option<InFlight>,
    /// Items accumulated across pages for the active async query.
    loaded: Vec<T>,
    /// Full derived group set for the active query, before windowing.
    derived: Option<Rc<Vec<Group<T>>>>,
    /// Offline reveal window, grown by `load_more`.
    visible_limit: usize,
    disposed: bool,
}

impl<T, K> SearchController<T, K>
where
    T: Clone + 'static,
    K: Eq + Hash + Clone + 'static,
{
    /// Controller over an owned in-memory collection.
    #[must_use]
    pub fn offline(items: Vec<T>, accessors: ItemAccessors<T, K>, config: SearchConfig) -> Self {
        Self::from_source(DataSource::OfflineOwned(items), accessors, config)
    }

    /// Controller over an async paged loader.
    #[must_use]
    pub fn with_loader(
        loader: impl PageLoader<T> + 'static,
        accessors: ItemAccessors<T, K>,
        config: SearchConfig,
    ) -> Self {
        Self::from_source(DataSource::AsyncOwned(Box::new(loader)), accessors, config)
    }

    /// Controller over a host-shared collection. The host mutates the shared
    /// vector and calls [`refresh`](Self::refresh) to re-derive.
    #[must_use]
    pub fn external(
        items: Rc<RefCell<Vec<T>>>,
        accessors: ItemAccessors<T, K>,
        config: SearchConfig,
    ) -> Self {
        Self::from_source(DataSource::External(items), accessors, config)
    }

    fn from_source(
        source: DataSource<T>,
        accessors: ItemAccessors<T, K>,
        config: SearchConfig,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel();
        let visible_limit = config.page_size;
        Self {
            matcher: FuzzyMatcher::new(config.matcher),
            cache: ResultCache::new(config.cache_capacity),
            accessors,
            config,
            source,
            state: SearchState::default(),
            pagination: PaginationState::default(),
            pending_query: String::new(),
            filters: IndexMap::new(),
            sort: None,
            selection: Selection::new(),
            arbiter: RequestArbiter::new(),
            debounce: DebounceTimer::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            completion_tx,
            completion_rx,
            in_flight: None,
            loaded: Vec::new(),
            derived: None,
            visible_limit,
            disposed: false,
        }
    }

    // ────────────────────────────── queries ──────────────────────────────

    /// Record a query edit.
    ///
    /// Under [`TriggerMode::OnEdit`] this (re)arms the debounce timer;
    /// rapid edits coalesce into a single execution when the timer fires on
    /// a later [`tick`](Self::tick). Under [`TriggerMode::OnSubmit`] the
    /// query is only recorded until [`submit`](Self::submit).
    pub fn search(&mut self, query: &str) {
        self.search_at(query, Instant::now());
    }

    /// [`search`](Self::search) with an explicit clock reading.
    pub fn search_at(&mut self, query: &str, now: Instant) {
        if self.disposed {
            tracing::trace!("search on disposed controller ignored");
            return;
        }
        self.pending_query = query.to_owned();
        match self.config.trigger {
            TriggerMode::OnEdit => self.debounce.arm(now, self.config.debounce_delay),
            TriggerMode::OnSubmit => {}
        }
    }

    /// Execute `query` immediately, bypassing the debounce.
    pub fn search_immediate(&mut self, query: &str) {
        if self.disposed {
            tracing::trace!("search on disposed controller ignored");
            return;
        }
        self.debounce.cancel();
        self.pending_query = query.to_owned();
        self.execute_search(query.to_owned());
    }

    /// Execute the pending query now. The trigger for
    /// [`TriggerMode::OnSubmit`]; under `OnEdit` it short-circuits a pending
    /// debounce.
    pub fn submit(&mut self) {
        if self.disposed {
            tracing::trace!("submit on disposed controller ignored");
            return;
        }
        self.debounce.cancel();
        let query = self.pending_query.clone();
        self.execute_search(query);
    }

    /// Drive the controller: fire a due debounce deadline and drain loader
    /// completions. Call from the host event loop.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// [`tick`](Self::tick) with an explicit clock reading.
    pub fn tick_at(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        if self.debounce.fire(now) {
            let query = self.pending_query.clone();
            self.execute_search(query);
        }
        self.pump();
    }

    fn execute_search(&mut self, query: String) {
        tracing::debug!(query = %query, "executing search");
        if matches!(&self.source, DataSource::AsyncOwned(_)) {
            self.execute_async(query);
        } else {
            self.execute_offline(query);
        }
    }

    // ───────────────────────── offline pipeline ──────────────────────────

    fn execute_offline(&mut self, query: String) {
        let id = self.arbiter.next_id();
        self.visible_limit = self.config.page_size;
        self.pagination.reset();

        let sort_name = self.sort.as_ref().map(|(name, _)| name.clone());
        let key = self.cache.key_for(
            &query,
            self.filters.keys().map(String::as_str),
            sort_name.as_deref(),
        );
        let groups = if let Some(hit) = self.cache.get(&key) {
            hit
        } else {
            let derived = Rc::new(self.derive_groups(&query));
            self.cache.put(key, Rc::clone(&derived));
            derived
        };

        self.state.query = query;
        self.state.phase = SearchPhase::Loaded;
        self.state.error = None;
        self.state.is_loading = false;
        self.state.active_request = id;
        self.state.total_known = Some(total_items(&groups));
        self.derived = Some(groups);
        self.apply_window();
        self.notify_state();
    }

    /// Run the full derivation for the offline/external pipeline: match
    /// filter, user filters, grouping, per-group ordering.
    fn derive_groups(&self, query: &str) -> Vec<Group<T>> {
        let entries = match &self.source {
            DataSource::OfflineOwned(items) => self.score_entries(items, query),
            DataSource::External(cell) => {
                let items = cell.borrow();
                self.score_entries(&items, query)
            }
            DataSource::AsyncOwned(_) => Vec::new(),
        };
        let rank_by_score = !query.is_empty() && self.sort.is_none();
        let comparator = self
            .sort
            .as_ref()
            .map(|(_, cmp)| &**cmp as &dyn Fn(&T, &T) -> Ordering);
        group_and_sort(entries, self.accessors.group_fn(), comparator, rank_by_score)
    }

    /// Score and filter `items`. An empty query includes everything at score
    /// `1.0`; otherwise the best field score must clear the inclusion
    /// threshold (exact-only when fuzzy inclusion is off).
    fn score_entries(&self, items: &[T], query: &str) -> Vec<ScoredEntry<T>> {
        let min_score = self.config.fuzzy_min_score.unwrap_or(1.0);
        let mut entries = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if !self.filters.values().all(|predicate| predicate(item)) {
                continue;
            }
            let score = if query.is_empty() {
                1.0
            } else {
                let texts = self.accessors.texts_of(item);
                match self.matcher.match_fields(query, &texts) {
                    Some((_, result)) if result.score >= min_score => result.score,
                    _ => continue,
                }
            };
            entries.push(ScoredEntry {
                item: item.clone(),
                score,
                index,
            });
        }
        entries
    }

    fn apply_window(&mut self) {
        let visible = match &self.derived {
            Some(derived) => {
                let (visible, truncated) = paginate(derived, self.visible_limit);
                self.state.has_more = truncated;
                visible
            }
            None => {
                self.state.has_more = false;
                Vec::new()
            }
        };
        self.state.results = flatten(&visible);
        self.state.groups = visible;
    }

    // ────────────────────────── async pipeline ───────────────────────────

    fn execute_async(&mut self, query: String) {
        let id = self.arbiter.next_id();
        self.pagination.reset();
        self.state.query = query;
        self.state.phase = SearchPhase::Searching;
        self.state.is_loading = true;
        self.state.error = None;
        self.state.active_request = id;
        self.in_flight = Some(InFlight { cursor: None });
        self.notify_state();
        self.issue_load(id, None);
        self.pump();
    }

    fn issue_load(&mut self, id: RequestId, cursor: Option<Cursor>) {
        let request = LoadRequest {
            request_id: id,
            query: self.state.query.clone(),
            cursor,
            page_size: self.config.page_size,
        };
        let completion = LoadCompletion::new(id, self.completion_tx.clone());
        if let DataSource::AsyncOwned(loader) = &mut self.source {
            loader.load(request, completion);
        }
    }

    /// Drain delivered completions. Stale ones (superseded request id) are
    /// logged and dropped without touching state.
    fn pump(&mut self) {
        while let Ok(event) = self.completion_rx.try_recv() {
            self.apply_completion(event);
        }
    }

    fn apply_completion(&mut self, event: LoadEvent<T>) {
        if self.disposed {
            return;
        }
        if !self.arbiter.is_current(event.request_id) {
            tracing::debug!(request = %event.request_id, "stale completion dropped");
            return;
        }
        let was_initial = self
            .in_flight
            .take()
            .is_none_or(|in_flight| in_flight.cursor.is_none());

        match event.outcome {
            Ok(page) => {
                if was_initial {
                    self.loaded = page.items;
                    self.state.total_known = page.total;
                } else {
                    self.loaded.extend(page.items);
                    if page.total.is_some() {
                        self.state.total_known = page.total;
                    }
                }
                self.pagination.cursor = page.next_cursor;
                self.pagination.has_more = page.has_more;
                self.state.phase = SearchPhase::Loaded;
                self.state.error = None;
                self.state.is_loading = false;
                self.rederive_loaded();
            }
            Err(message) => {
                // Prior results, selection, and pagination stay intact.
                tracing::debug!(request = %event.request_id, error = %message, "load failed");
                self.state.phase = SearchPhase::Error;
                self.state.error = Some(message);
                self.state.is_loading = false;
            }
        }
        self.notify_state();
    }

    /// Re-derive visible results from the accumulated async pages: user
    /// filters, grouping, and sort apply, but never the match filter — the
    /// loader's relevance judgement is authoritative.
    fn rederive_loaded(&mut self) {
        let entries = self.score_entries(&self.loaded, "");
        let comparator = self
            .sort
            .as_ref()
            .map(|(_, cmp)| &**cmp as &dyn Fn(&T, &T) -> Ordering);
        let groups = group_and_sort(entries, self.accessors.group_fn(), comparator, false);
        self.derived = Some(Rc::new(groups));
        self.visible_limit = usize::MAX;
        self.apply_window();
        self.state.has_more = self.pagination.has_more;
    }

    // ─────────────────────────── pagination ──────────────────────────────

    /// Reveal or fetch the next page.
    ///
    /// Offline: grows the reveal window by one page size. Async: issues a
    /// cursor-tagged load; ignored while another load is in flight or when
    /// no continuation exists.
    pub fn load_more(&mut self) {
        if self.disposed {
            tracing::trace!("load_more on disposed controller ignored");
            return;
        }
        if matches!(&self.source, DataSource::AsyncOwned(_)) {
            if self.in_flight.is_some() || !self.pagination.has_more {
                return;
            }
            let id = self.arbiter.next_id();
            let cursor = self.pagination.cursor.clone();
            self.state.active_request = id;
            self.state.is_loading = true;
            self.in_flight = Some(InFlight {
                cursor: cursor.clone(),
            });
            self.notify_state();
            self.issue_load(id, cursor);
            self.pump();
        } else if self.state.has_more {
            self.visible_limit = self.visible_limit.saturating_add(self.config.page_size);
            self.apply_window();
            self.notify_state();
        }
    }

    // ──────────────────────── filters and sorting ────────────────────────

    /// Register (or re-register) a named filter predicate and re-derive.
    ///
    /// Re-registering under an existing name bumps that name's cache
    /// version, so entries memoized against the old predicate are orphaned
    /// rather than served stale.
    pub fn set_filter(&mut self, name: &str, predicate: impl Fn(&T) -> bool + 'static) {
        if self.disposed {
            tracing::trace!("set_filter on disposed controller ignored");
            return;
        }
        if self.filters.contains_key(name) {
            self.cache.bump_version(name);
        }
        self.filters.insert(name.to_owned(), Box::new(predicate));
        self.refresh_derivation();
    }

    /// Remove a named filter and re-derive. Returns whether it existed.
    pub fn remove_filter(&mut self, name: &str) -> bool {
        if self.disposed {
            tracing::trace!("remove_filter on disposed controller ignored");
            return false;
        }
        let removed = self.filters.shift_remove(name).is_some();
        if removed {
            self.refresh_derivation();
        }
        removed
    }

    /// Install a named sort comparator and re-derive. The name is the sort's
    /// cache identity; distinct orderings must use distinct names.
    pub fn set_sort(&mut self, name: &str, comparator: impl Fn(&T, &T) -> Ordering + 'static) {
        if self.disposed {
            tracing::trace!("set_sort on disposed controller ignored");
            return;
        }
        self.sort = Some((name.to_owned(), Box::new(comparator)));
        self.refresh_derivation();
    }

    /// Remove the sort comparator, restoring default ordering, and re-derive.
    pub fn clear_sort(&mut self) {
        if self.disposed {
            return;
        }
        if self.sort.take().is_some() {
            self.refresh_derivation();
        }
    }

    /// Re-derive the current query under the present filters and sort.
    /// No-op before the first execution.
    fn refresh_derivation(&mut self) {
        if self.state.phase == SearchPhase::Idle {
            return;
        }
        if matches!(&self.source, DataSource::AsyncOwned(_)) {
            self.rederive_loaded();
            self.notify_state();
        } else {
            let query = self.state.query.clone();
            self.execute_offline(query);
        }
    }

    /// Re-derive after the underlying collection changed out from under the
    /// controller (external mode, or owned items mutated via
    /// [`set_items`](Self::set_items)). Drops all memoized results
    /// first; for an async source, re-issues the active query.
    pub fn refresh(&mut self) {
        if self.disposed {
            tracing::trace!("refresh on disposed controller ignored");
            return;
        }
        self.cache.clear();
        if self.state.phase == SearchPhase::Idle {
            return;
        }
        if matches!(&self.source, DataSource::AsyncOwned(_)) {
            let query = self.state.query.clone();
            self.execute_async(query);
        } else {
            let query = self.state.query.clone();
            self.execute_offline(query);
        }
    }

    /// Replace the owned collection and re-derive. Ignored for async and
    /// external sources.
    pub fn set_items(&mut self, items: Vec<T>) {
        if self.disposed {
            tracing::trace!("set_items on disposed controller ignored");
            return;
        }
        if let DataSource::OfflineOwned(owned) = &mut self.source {
            *owned = items;
            self.refresh();
        }
    }

    /// Replace the page loader. Honored only for async sources. Outstanding
    /// requests against the old loader are orphaned; the next executed
    /// search goes to the new one.
    pub fn set_loader(&mut self, loader: impl PageLoader<T> + 'static) {
        if self.disposed {
            tracing::trace!("set_loader on disposed controller ignored");
            return;
        }
        if let DataSource::AsyncOwned(slot) = &mut self.source {
            *slot = Box::new(loader);
            self.arbiter.invalidate();
            self.in_flight = None;
            self.state.is_loading = false;
        }
    }

    // ──────────────────────────── selection ──────────────────────────────

    /// Toggle selection of `id`. Returns whether it is selected afterwards.
    pub fn toggle_select(&mut self, id: K) -> bool {
        if self.disposed {
            return false;
        }
        let selected = self.selection.toggle(id);
        self.notify_selection();
        selected
    }

    /// Select every currently visible item. Returns how many were newly
    /// selected.
    pub fn select_all(&mut self) -> usize {
        if self.disposed {
            return 0;
        }
        let ids: Vec<K> = self
            .state
            .results
            .iter()
            .map(|item| self.accessors.id_of(item))
            .collect();
        let added = self.selection.extend(ids);
        if added > 0 {
            self.notify_selection();
        }
        added
    }

    /// Select every visible item satisfying `predicate`. Returns how many
    /// were newly selected.
    pub fn select_where(&mut self, predicate: impl Fn(&T) -> bool) -> usize {
        if self.disposed {
            return 0;
        }
        let ids: Vec<K> = self
            .state
            .results
            .iter()
            .filter(|item| predicate(item))
            .map(|item| self.accessors.id_of(item))
            .collect();
        let added = self.selection.extend(ids);
        if added > 0 {
            self.notify_selection();
        }
        added
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        if self.disposed {
            return;
        }
        if self.selection.clear() {
            self.notify_selection();
        }
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: &K) -> bool {
        self.selection.contains(id)
    }

    /// Snapshot of the selected identity set.
    #[must_use]
    pub fn selected(&self) -> HashSet<K> {
        self.selection.snapshot()
    }

    /// Number of selected identities.
    #[must_use]
    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    // ───────────────────────── subscriptions ─────────────────────────────

    /// Register a subscriber. It is immediately sent the current state.
    ///
    /// Subscribers must not call back into mutating controller methods
    /// during notification; the controller is single-threaded and holds no
    /// re-entrancy guard.
    pub fn subscribe(&mut self, subscriber: Rc<dyn SearchSubscriber<T, K>>) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        if self.disposed {
            tracing::trace!("subscribe on disposed controller ignored");
            return id;
        }
        subscriber.on_state(&self.state);
        self.subscribers.push((id, subscriber));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn notify_state(&self) {
        for (_, subscriber) in &self.subscribers {
            subscriber.on_state(&self.state);
        }
    }

    fn notify_selection(&self) {
        let snapshot = self.selection.snapshot();
        for (_, subscriber) in &self.subscribers {
            subscriber.on_selection(&snapshot);
        }
    }

    // ─────────────────────────── inspection ──────────────────────────────

    /// The current state snapshot.
    #[must_use]
    pub const fn state(&self) -> &SearchState<T> {
        &self.state
    }

    /// The most recently edited query (may not have executed yet).
    #[must_use]
    pub fn pending_query(&self) -> &str {
        &self.pending_query
    }

    /// Result-cache counters.
    #[must_use]
    pub const fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ───────────────────────────── teardown ──────────────────────────────

    /// Tear the controller down: cancel the pending debounce, orphan every
    /// in-flight request, and drop all subscribers. Idempotent; subsequent
    /// mutating calls become traced no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        tracing::debug!("controller disposed");
        self.debounce.cancel();
        self.arbiter.invalidate();
        self.in_flight = None;
        self.subscribers.clear();
        self.disposed = true;
    }
}

impl<T, K> std::fmt::Debug for SearchController<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("phase", &self.state.phase)
            .field("query", &self.state.query)
            .field("subscribers", &self.subscribers.len())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
