//! Search coordination core: a tick-driven controller over an arbitrary
//! collection, with debounced queries, an offline derivation pipeline
//! (match, filter, group, sort, paginate) memoized in an LRU cache, async
//! page loads arbitrated by monotonic request ids, and identity-based
//! multi-selection.
//!
//! Matching itself lives in the `sift-match` crate; this crate consumes it
//! through [`sift_match::FuzzyMatcher`].
//!
//! # Quick start
//!
//! ```
//! use sift_core::{ItemAccessors, SearchConfig, SearchController};
//!
//! #[derive(Clone)]
//! struct Contact {
//!     id: u32,
//!     name: String,
//! }
//!
//! let contacts = vec![
//!     Contact { id: 1, name: "Ada Lovelace".into() },
//!     Contact { id: 2, name: "Grace Hopper".into() },
//! ];
//! let accessors = ItemAccessors::new(
//!     |c: &Contact| c.id,
//!     |c: &Contact| vec![c.name.clone()],
//! );
//! let mut controller = SearchController::offline(contacts, accessors, SearchConfig::default());
//! controller.search_immediate("grace");
//! assert_eq!(controller.state().results.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod accessor;
pub mod arbiter;
pub mod cache;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod loader;
pub mod results;
pub mod selection;
pub mod state;

pub use accessor::ItemAccessors;
pub use arbiter::{RequestArbiter, RequestId};
pub use cache::{CacheKey, CacheStats, ResultCache, DEFAULT_CACHE_CAPACITY};
pub use config::{SearchConfig, TriggerMode, DEFAULT_DEBOUNCE_DELAY, DEFAULT_PAGE_SIZE};
pub use controller::{
    FilterPredicate, SearchController, SearchSubscriber, SortComparator, SubscriptionId,
};
pub use debounce::DebounceTimer;
pub use error::{Error, Result};
pub use loader::{Cursor, LoadCompletion, LoadRequest, LoadedPage, PageLoader};
pub use results::{Group, ScoredEntry};
pub use selection::Selection;
pub use state::{PaginationState, SearchPhase, SearchState};
