//! End-to-end controller flows: debounce coalescing, async arbitration,
//! cache versioning, pagination, grouping, selection, and teardown.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::{Duration, Instant};

use sift_core::{
    Cursor, ItemAccessors, LoadCompletion, LoadRequest, LoadedPage, SearchConfig, SearchController,
    SearchPhase, SearchState, SearchSubscriber, TriggerMode,
};

#[derive(Clone, Debug, PartialEq)]
struct Track {
    id: u32,
    title: String,
    artist: String,
}

fn track(id: u32, title: &str, artist: &str) -> Track {
    Track {
        id,
        title: title.to_owned(),
        artist: artist.to_owned(),
    }
}

fn library() -> Vec<Track> {
    vec![
        track(1, "banana pancakes", "jack"),
        track(2, "cherry wine", "hozier"),
        track(3, "apple blossom", "white"),
        track(4, "green apple", "echo"),
        track(5, "pineapple skies", "miguel"),
    ]
}

fn accessors() -> ItemAccessors<Track, u32> {
    ItemAccessors::new(
        |t: &Track| t.id,
        |t: &Track| vec![t.title.clone(), t.artist.clone()],
    )
}

fn grouped_accessors() -> ItemAccessors<Track, u32> {
    accessors().with_group_key(|t: &Track| t.artist.clone())
}

/// Subscriber that records every snapshot it is handed.
#[derive(Default)]
struct Recorder {
    phases: RefCell<Vec<SearchPhase>>,
    queries: RefCell<Vec<String>>,
    selection_sizes: RefCell<Vec<usize>>,
}

impl SearchSubscriber<Track, u32> for Recorder {
    fn on_state(&self, state: &SearchState<Track>) {
        self.phases.borrow_mut().push(state.phase);
        self.queries.borrow_mut().push(state.query.clone());
    }

    fn on_selection(&self, selected: &HashSet<u32>) {
        self.selection_sizes.borrow_mut().push(selected.len());
    }
}

fn titles(controller: &SearchController<Track, u32>) -> Vec<String> {
    controller
        .state()
        .results
        .iter()
        .map(|t| t.title.clone())
        .collect()
}

// ───────────────────────────── debounce ─────────────────────────────────

#[test]
fn rapid_edits_coalesce_into_one_execution() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    let recorder = Rc::new(Recorder::default());
    controller.subscribe(recorder.clone());

    let start = Instant::now();
    controller.search_at("a", start);
    controller.search_at("ap", start + Duration::from_millis(50));
    controller.search_at("app", start + Duration::from_millis(100));

    // Before the last edit's deadline nothing runs.
    controller.tick_at(start + Duration::from_millis(350));
    assert_eq!(controller.state().phase, SearchPhase::Idle);

    controller.tick_at(start + Duration::from_millis(400));
    assert_eq!(controller.state().phase, SearchPhase::Loaded);

    // One snapshot from subscribe, one from the single execution.
    assert_eq!(recorder.queries.borrow().as_slice(), ["", "app"]);
}

#[test]
fn submit_mode_ignores_edits_until_submitted() {
    let config = SearchConfig::default().with_trigger(TriggerMode::OnSubmit);
    let mut controller = SearchController::offline(library(), accessors(), config);

    let start = Instant::now();
    controller.search_at("apple", start);
    controller.tick_at(start + Duration::from_secs(10));
    assert_eq!(controller.state().phase, SearchPhase::Idle);

    controller.submit();
    assert_eq!(controller.state().phase, SearchPhase::Loaded);
    assert_eq!(controller.state().query, "apple");
}

#[test]
fn search_immediate_bypasses_debounce() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    let start = Instant::now();
    controller.search_at("cherry", start);
    controller.search_immediate("apple");
    assert_eq!(controller.state().query, "apple");

    // The superseded debounce deadline must not fire later.
    controller.tick_at(start + Duration::from_secs(1));
    assert_eq!(controller.state().query, "apple");
}

// ──────────────────────── offline derivation ────────────────────────────

#[test]
fn equal_scores_fall_back_to_base_order() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.search_immediate("apple");
    // All three are exact substring hits; the tie breaks on base order.
    assert_eq!(
        titles(&controller),
        ["apple blossom", "green apple", "pineapple skies"]
    );
}

#[test]
fn exact_matches_rank_above_fuzzy_ones() {
    let items = vec![track(1, "aple", "x"), track(2, "apple pie", "y")];
    let mut controller = SearchController::offline(items, accessors(), SearchConfig::default());
    controller.search_immediate("apple");
    // One edit away still matches, but never outranks the exact hit.
    assert_eq!(titles(&controller), ["apple pie", "aple"]);
}

#[test]
fn typo_still_matches_through_fuzzy_phases() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.search_immediate("bnna");
    assert_eq!(titles(&controller), ["banana pancakes"]);
}

#[test]
fn fuzzy_threshold_gates_inclusion() {
    let items = vec![track(1, "Apple", "x"), track(2, "Banana", "y")];
    let config = SearchConfig::default().with_fuzzy_min_score(Some(0.3));
    let mut controller = SearchController::offline(items, accessors(), config);
    controller.search_immediate("bnna");
    assert_eq!(titles(&controller), ["Banana"]);
}

#[test]
fn empty_query_returns_everything_in_base_order() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.search_immediate("");
    assert_eq!(controller.state().results.len(), 5);
    assert_eq!(titles(&controller)[0], "banana pancakes");
    assert_eq!(controller.state().total_known, Some(5));
}

#[test]
fn exact_only_mode_excludes_fuzzy_matches() {
    let config = SearchConfig::default().with_fuzzy_min_score(None);
    let mut controller = SearchController::offline(library(), accessors(), config);
    controller.search_immediate("bnna");
    assert!(controller.state().results.is_empty());

    controller.search_immediate("apple");
    // "pineapple" contains "apple" so it stays; no fuzzy-only entries.
    assert_eq!(controller.state().results.len(), 3);
}

#[test]
fn matching_considers_every_text_field() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.search_immediate("hozier");
    assert_eq!(titles(&controller), ["cherry wine"]);
}

// ──────────────────────── filters and caching ───────────────────────────

#[test]
fn repeated_query_is_served_from_cache() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.search_immediate("apple");
    assert_eq!(controller.cache_stats().hits, 0);

    controller.search_immediate("cherry");
    controller.search_immediate("apple");
    assert_eq!(controller.cache_stats().hits, 1);
    assert_eq!(controller.state().results.len(), 3);
}

#[test]
fn reregistered_filter_invalidates_cached_results() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.search_immediate("");
    controller.set_filter("artist", |t: &Track| t.artist == "jack");
    assert_eq!(titles(&controller), ["banana pancakes"]);

    // Same name, different predicate: the old memoized page must not serve.
    controller.set_filter("artist", |t: &Track| t.artist == "hozier");
    assert_eq!(titles(&controller), ["cherry wine"]);
}

#[test]
fn removing_a_filter_restores_the_wider_result() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.search_immediate("apple");
    controller.set_filter("short", |t: &Track| t.title.len() < 12);
    assert_eq!(titles(&controller), ["green apple"]);

    assert!(controller.remove_filter("short"));
    assert_eq!(controller.state().results.len(), 3);
    assert!(!controller.remove_filter("short"));
}

#[test]
fn filters_and_match_compose_conjunctively() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.set_filter("not-echo", |t: &Track| t.artist != "echo");
    controller.search_immediate("apple");
    assert_eq!(titles(&controller), ["apple blossom", "pineapple skies"]);
}

// ───────────────────────── grouping and sort ────────────────────────────

#[test]
fn groups_form_in_first_seen_order_without_empties() {
    let items = vec![
        track(1, "apple one", "white"),
        track(2, "cherry", "hozier"),
        track(3, "apple two", "white"),
    ];
    let mut controller =
        SearchController::offline(items, grouped_accessors(), SearchConfig::default());
    controller.search_immediate("apple");

    let keys: Vec<_> = controller
        .state()
        .groups
        .iter()
        .map(|g| g.key.clone())
        .collect();
    // "hozier" matched nothing, so no empty group appears for it.
    assert_eq!(keys, [Some("white".to_owned())]);
    assert!(controller.state().groups.iter().all(|g| !g.items.is_empty()));
}

#[test]
fn comparator_orders_within_groups() {
    let mut controller =
        SearchController::offline(library(), grouped_accessors(), SearchConfig::default());
    controller.search_immediate("");
    controller.set_sort("title", |a: &Track, b: &Track| a.title.cmp(&b.title));

    let first_titles: Vec<_> = controller
        .state()
        .groups
        .iter()
        .map(|g| g.items[0].title.clone())
        .collect();
    // Each artist group is one track here, sorted internally by title.
    assert_eq!(controller.state().groups.len(), 5);
    assert_eq!(first_titles[0], "banana pancakes");

    controller.clear_sort();
    assert_eq!(controller.state().results.len(), 5);
}

// ──────────────────────── offline pagination ────────────────────────────

#[test]
fn load_more_grows_the_reveal_window() {
    let config = SearchConfig::default().with_page_size(2);
    let mut controller = SearchController::offline(library(), accessors(), config);
    controller.search_immediate("");

    assert_eq!(controller.state().results.len(), 2);
    assert!(controller.state().has_more);
    assert_eq!(controller.state().total_known, Some(5));

    controller.load_more();
    assert_eq!(controller.state().results.len(), 4);
    assert!(controller.state().has_more);

    controller.load_more();
    assert_eq!(controller.state().results.len(), 5);
    assert!(!controller.state().has_more);

    // Exhausted: further calls change nothing.
    controller.load_more();
    assert_eq!(controller.state().results.len(), 5);
}

#[test]
fn new_search_resets_the_window() {
    let config = SearchConfig::default().with_page_size(2);
    let mut controller = SearchController::offline(library(), accessors(), config);
    controller.search_immediate("");
    controller.load_more();
    assert_eq!(controller.state().results.len(), 4);

    controller.search_immediate("apple");
    assert_eq!(controller.state().results.len(), 2);
    assert!(controller.state().has_more);
}

// ─────────────────────────── async loading ──────────────────────────────

type Captured = Rc<RefCell<Vec<(LoadRequest, LoadCompletion<Track>)>>>;

/// Async controller whose loader parks every request for manual resolution.
fn parked_loader_controller(config: SearchConfig) -> (SearchController<Track, u32>, Captured) {
    let captured: Captured = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&captured);
    let controller = SearchController::with_loader(
        move |request: LoadRequest, completion: LoadCompletion<Track>| {
            sink.borrow_mut().push((request, completion));
        },
        accessors(),
        config,
    );
    (controller, captured)
}

#[test]
fn async_search_transitions_searching_then_loaded() {
    let (mut controller, captured) = parked_loader_controller(SearchConfig::default());
    let recorder = Rc::new(Recorder::default());
    controller.subscribe(recorder.clone());

    controller.search_immediate("cherry");
    assert_eq!(controller.state().phase, SearchPhase::Searching);
    assert!(controller.state().is_loading);

    let (request, completion) = captured.borrow_mut().remove(0);
    assert_eq!(request.query, "cherry");
    assert!(request.cursor.is_none());
    completion
        .resolve(LoadedPage::finished(vec![track(2, "cherry wine", "hozier")]).with_total(1))
        .unwrap();

    controller.tick();
    assert_eq!(controller.state().phase, SearchPhase::Loaded);
    assert!(!controller.state().is_loading);
    assert_eq!(titles(&controller), ["cherry wine"]);
    assert_eq!(controller.state().total_known, Some(1));
    assert_eq!(
        recorder.phases.borrow().as_slice(),
        [SearchPhase::Idle, SearchPhase::Searching, SearchPhase::Loaded],
    );
}

#[test]
fn stale_completion_is_dropped_regardless_of_arrival_order() {
    let (mut controller, captured) = parked_loader_controller(SearchConfig::default());

    controller.search_immediate("first");
    controller.search_immediate("second");
    assert_eq!(captured.borrow().len(), 2);

    let (_, old) = captured.borrow_mut().remove(0);
    let (_, new) = captured.borrow_mut().remove(0);

    // Newest resolves first; the stale one lands afterwards.
    new.resolve(LoadedPage::finished(vec![track(9, "current", "x")]))
        .unwrap();
    controller.tick();
    assert_eq!(titles(&controller), ["current"]);

    old.resolve(LoadedPage::finished(vec![track(8, "stale", "x")]))
        .unwrap();
    controller.tick();
    assert_eq!(titles(&controller), ["current"]);
    assert_eq!(controller.state().phase, SearchPhase::Loaded);
}

#[test]
fn async_pagination_appends_pages_via_cursor() {
    let (mut controller, captured) = parked_loader_controller(SearchConfig::default());
    controller.search_immediate("a");

    // load_more while the first page is in flight is ignored.
    controller.load_more();
    assert_eq!(captured.borrow().len(), 1);

    let (_, first) = captured.borrow_mut().remove(0);
    first
        .resolve(LoadedPage::with_more(
            vec![track(1, "page one", "x")],
            Cursor::Offset(1),
        ))
        .unwrap();
    controller.tick();
    assert!(controller.state().has_more);

    controller.load_more();
    let (request, second) = captured.borrow_mut().remove(0);
    assert_eq!(request.cursor, Some(Cursor::Offset(1)));
    second
        .resolve(LoadedPage::finished(vec![track(2, "page two", "x")]))
        .unwrap();
    controller.tick();

    assert_eq!(titles(&controller), ["page one", "page two"]);
    assert!(!controller.state().has_more);

    // No continuation left: nothing new is issued.
    controller.load_more();
    assert!(captured.borrow().is_empty());
}

#[test]
fn loader_failure_keeps_prior_results() {
    let (mut controller, captured) = parked_loader_controller(SearchConfig::default());

    controller.search_immediate("good");
    let (_, ok) = captured.borrow_mut().remove(0);
    ok.resolve(LoadedPage::finished(vec![track(1, "kept", "x")]))
        .unwrap();
    controller.tick();
    assert_eq!(titles(&controller), ["kept"]);

    controller.search_immediate("bad");
    let (_, failing) = captured.borrow_mut().remove(0);
    failing.reject("backend exploded").unwrap();
    controller.tick();

    assert_eq!(controller.state().phase, SearchPhase::Error);
    assert_eq!(
        controller.state().error.as_deref(),
        Some("backend exploded")
    );
    assert_eq!(titles(&controller), ["kept"]);

    // A later successful search recovers cleanly.
    controller.search_immediate("again");
    let (_, recovered) = captured.borrow_mut().remove(0);
    recovered
        .resolve(LoadedPage::finished(vec![track(2, "fresh", "x")]))
        .unwrap();
    controller.tick();
    assert_eq!(controller.state().phase, SearchPhase::Loaded);
    assert!(controller.state().error.is_none());
    assert_eq!(titles(&controller), ["fresh"]);
}

#[test]
fn user_filters_apply_over_loaded_pages() {
    let (mut controller, captured) = parked_loader_controller(SearchConfig::default());
    controller.search_immediate("a");
    let (_, completion) = captured.borrow_mut().remove(0);
    completion
        .resolve(LoadedPage::finished(vec![
            track(1, "keep me", "jack"),
            track(2, "drop me", "echo"),
        ]))
        .unwrap();
    controller.tick();
    assert_eq!(controller.state().results.len(), 2);

    controller.set_filter("not-echo", |t: &Track| t.artist != "echo");
    assert_eq!(titles(&controller), ["keep me"]);
}

// ─────────────────────────── selection ──────────────────────────────────

#[test]
fn selection_survives_query_and_filter_changes() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.search_immediate("");
    assert!(controller.toggle_select(2));
    assert!(controller.toggle_select(5));

    controller.search_immediate("apple");
    assert!(controller.is_selected(&2));
    assert!(controller.is_selected(&5));

    controller.set_filter("none", |_: &Track| false);
    assert!(controller.state().results.is_empty());
    assert_eq!(controller.selection_len(), 2);
}

#[test]
fn select_all_covers_visible_items_only() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.search_immediate("apple");
    assert_eq!(controller.select_all(), 3);
    assert_eq!(controller.selection_len(), 3);
    assert!(!controller.is_selected(&1));
    assert!(!controller.is_selected(&2));
}

#[test]
fn select_where_and_clear_notify_subscribers() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    let recorder = Rc::new(Recorder::default());
    controller.subscribe(recorder.clone());
    controller.search_immediate("");

    assert_eq!(controller.select_where(|t| t.artist == "white"), 1);
    controller.clear_selection();
    assert_eq!(recorder.selection_sizes.borrow().as_slice(), [1, 0]);
}

// ───────────────────────── external source ──────────────────────────────

#[test]
fn external_source_rederives_on_refresh() {
    let shared = Rc::new(RefCell::new(vec![track(1, "apple blossom", "white")]));
    let mut controller =
        SearchController::external(Rc::clone(&shared), accessors(), SearchConfig::default());
    controller.search_immediate("apple");
    assert_eq!(controller.state().results.len(), 1);

    shared.borrow_mut().push(track(2, "green apple", "echo"));
    // Not visible until the host signals the change.
    assert_eq!(controller.state().results.len(), 1);
    controller.refresh();
    assert_eq!(controller.state().results.len(), 2);
}

#[test]
fn set_items_rederives_owned_collections() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    controller.search_immediate("apple");
    assert_eq!(controller.state().results.len(), 3);

    controller.set_items(vec![track(7, "apple pie", "new")]);
    assert_eq!(titles(&controller), ["apple pie"]);
}

#[test]
fn set_loader_orphans_the_old_loader() {
    let (mut controller, old_captured) = parked_loader_controller(SearchConfig::default());
    controller.search_immediate("before");

    let replacement: Captured = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&replacement);
    controller.set_loader(move |request: LoadRequest, completion: LoadCompletion<Track>| {
        sink.borrow_mut().push((request, completion));
    });

    // The pre-swap request resolves into the void.
    let (_, orphaned) = old_captured.borrow_mut().remove(0);
    orphaned
        .resolve(LoadedPage::finished(vec![track(1, "old", "x")]))
        .unwrap();
    controller.tick();
    assert!(controller.state().results.is_empty());

    controller.search_immediate("after");
    let (request, completion) = replacement.borrow_mut().remove(0);
    assert_eq!(request.query, "after");
    completion
        .resolve(LoadedPage::finished(vec![track(2, "new", "x")]))
        .unwrap();
    controller.tick();
    assert_eq!(titles(&controller), ["new"]);
}

// ─────────────────────────── teardown ───────────────────────────────────

#[test]
fn dispose_silences_everything() {
    let (mut controller, captured) = parked_loader_controller(SearchConfig::default());
    let recorder = Rc::new(Recorder::default());
    controller.subscribe(recorder.clone());

    controller.search_immediate("gone");
    let before = recorder.phases.borrow().len();
    controller.dispose();
    assert!(controller.is_disposed());

    // In-flight completion resolves into the void.
    let (_, completion) = captured.borrow_mut().remove(0);
    completion
        .resolve(LoadedPage::finished(vec![track(1, "late", "x")]))
        .unwrap();
    controller.tick();
    assert_ne!(controller.state().phase, SearchPhase::Loaded);
    assert_eq!(recorder.phases.borrow().len(), before);

    // Post-disposal mutations are no-ops; dispose is idempotent.
    controller.search_immediate("ignored");
    controller.load_more();
    controller.set_filter("f", |_: &Track| true);
    assert!(!controller.toggle_select(1));
    controller.dispose();
    assert_eq!(controller.state().query, "gone");
}

#[test]
fn unsubscribe_stops_notifications() {
    let mut controller = SearchController::offline(library(), accessors(), SearchConfig::default());
    let recorder = Rc::new(Recorder::default());
    let id = controller.subscribe(recorder.clone());
    assert!(controller.unsubscribe(id));
    assert!(!controller.unsubscribe(id));

    controller.search_immediate("apple");
    // Only the initial snapshot from subscribe was delivered.
    assert_eq!(recorder.phases.borrow().len(), 1);
}
