//! Async page loading
//!
//! External data sources implement [`PageLoader`]: given a [`LoadRequest`]
//! (query, cursor, page size) they eventually resolve the supplied
//! [`LoadCompletion`] with a [`LoadedPage`] or reject it with a message.
//! Completions travel over an mpsc channel back to the controller's owning
//! context and are drained on `tick`, so a loader may respond synchronously,
//! from a task, or from another thread — completion order is irrelevant
//! because the controller discards anything tagged with a superseded
//! request id.
//!
//! Relevance is the loader's responsibility: the controller never re-filters
//! loader output against the query.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

use crate::arbiter::RequestId;
use crate::error::{Error, Result};

/// Opaque pagination position handed back by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cursor {
    /// Numeric offset into the result set.
    Offset(usize),
    /// Loader-defined continuation token.
    Token(String),
}

/// One load request issued by the controller.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Arbitration id; completions carry it back.
    pub request_id: RequestId,
    /// The query being searched.
    pub query: String,
    /// Position to load from; `None` for the first page.
    pub cursor: Option<Cursor>,
    /// Requested page size.
    pub page_size: usize,
}

/// One page of loader output.
#[derive(Debug, Clone)]
pub struct LoadedPage<T> {
    /// Items in relevance order (the loader's ordering is authoritative).
    pub items: Vec<T>,
    /// Whether more pages exist after this one.
    pub has_more: bool,
    /// Cursor for the next page; required whenever `has_more` is set.
    pub next_cursor: Option<Cursor>,
    /// Total matching count, when the backend knows it.
    pub total: Option<usize>,
}

impl<T> LoadedPage<T> {
    /// A final page with no continuation.
    #[must_use]
    pub const fn finished(items: Vec<T>) -> Self {
        Self {
            items,
            has_more: false,
            next_cursor: None,
            total: None,
        }
    }

    /// A page with a continuation cursor.
    #[must_use]
    pub const fn with_more(items: Vec<T>, next_cursor: Cursor) -> Self {
        Self {
            items,
            has_more: true,
            next_cursor: Some(next_cursor),
            total: None,
        }
    }

    /// Attach the backend's total matching count.
    #[must_use]
    pub const fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Check the pagination contract: `has_more` requires a cursor.
    fn validate(&self) -> Result<()> {
        if self.has_more && self.next_cursor.is_none() {
            return Err(Error::LoaderContract(
                "has_more is set but next_cursor is missing".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Completion outcome delivered back to the controller.
#[derive(Debug)]
pub(crate) struct LoadEvent<T> {
    pub request_id: RequestId,
    pub outcome: std::result::Result<LoadedPage<T>, String>,
}

/// Single-use handle for delivering a load result.
///
/// Consuming `self` on resolve/reject guarantees at most one response per
/// request. Safe to move to another thread.
#[derive(Debug)]
pub struct LoadCompletion<T> {
    request_id: RequestId,
    tx: Sender<LoadEvent<T>>,
}

impl<T> LoadCompletion<T> {
    pub(crate) const fn new(request_id: RequestId, tx: Sender<LoadEvent<T>>) -> Self {
        Self { request_id, tx }
    }

    /// The id this completion answers.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Deliver a successful page.
    ///
    /// A malformed page (`has_more` without `next_cursor`) is a contract
    /// violation reported here, synchronously, at the call site — it never
    /// reaches controller state.
    pub fn resolve(self, page: LoadedPage<T>) -> Result<()> {
        page.validate()?;
        self.tx
            .send(LoadEvent {
                request_id: self.request_id,
                outcome: Ok(page),
            })
            .map_err(|_| Error::ChannelClosed)
    }

    /// Deliver a failure message; the controller surfaces it as the `Error`
    /// phase without touching prior results.
    pub fn reject(self, message: impl Into<String>) -> Result<()> {
        self.tx
            .send(LoadEvent {
                request_id: self.request_id,
                outcome: Err(message.into()),
            })
            .map_err(|_| Error::ChannelClosed)
    }
}

/// A pageable, query-aware data source.
pub trait PageLoader<T> {
    /// Start loading the requested page. The implementation may resolve
    /// `completion` before returning or hand it off to finish later.
    fn load(&mut self, request: LoadRequest, completion: LoadCompletion<T>);
}

impl<T, F> PageLoader<T> for F
where
    F: FnMut(LoadRequest, LoadCompletion<T>),
{
    fn load(&mut self, request: LoadRequest, completion: LoadCompletion<T>) {
        self(request, completion);
    }
}
