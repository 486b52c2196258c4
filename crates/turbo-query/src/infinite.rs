//! Incremental page accumulation for infinite scrolling.
//!
//! An [`InfiniteQuery`] walks a [`PageSource`] from page 1, following each
//! page's `next_page`, and appends every page to an ordered result. At most
//! one request is outstanding at a time: a trigger that arrives while a page
//! is in flight is a no-op.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use turbo_catalog::{Page, PageSource};

use crate::cache::{QueryCache, QueryCacheExt};
use crate::error::QueryError;
use crate::key::QueryKey;
use crate::proximity::{ProximitySignal, Subscription};

/// First page requested by every infinite query.
pub const INITIAL_PAGE_PARAM: u32 = 1;

/// Pages fetched so far, in fetch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfiniteData<T> {
    /// The pages, oldest first.
    pub pages: Vec<Page<T>>,
    /// The page param that produced each page.
    pub page_params: Vec<u32>,
}

impl<T> InfiniteData<T> {
    /// Create empty data.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            page_params: Vec::new(),
        }
    }

    /// Create data holding a single first page.
    pub fn first(page: Page<T>) -> Self {
        Self {
            page_params: vec![page.page],
            pages: vec![page],
        }
    }

    /// Page param for the next request, or `None` when exhausted.
    pub fn next_page_param(&self) -> Option<u32> {
        match self.pages.last() {
            Some(last) => last.next_page,
            None => Some(INITIAL_PAGE_PARAM),
        }
    }

    /// Whether another page can be requested.
    pub fn has_more(&self) -> bool {
        self.next_page_param().is_some()
    }

    /// Total items reported by the data source.
    pub fn total_items(&self) -> Option<usize> {
        self.pages.first().map(|p| p.total_items)
    }

    /// Number of items across all pages.
    pub fn loaded_count(&self) -> usize {
        self.pages.iter().map(|p| p.len()).sum()
    }

    /// Items across all pages, first-fetched first.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    /// Append the page requested with `param`.
    ///
    /// Rejects a page that is not the next one in sequence.
    pub fn append(&mut self, param: u32, page: Page<T>) -> Result<(), QueryError> {
        let expected = match self.next_page_param() {
            Some(expected) if expected == param => expected,
            Some(expected) => return Err(QueryError::OutOfOrder { expected, got: param }),
            None => return Err(QueryError::OutOfOrder { expected: 0, got: param }),
        };
        if page.page != expected {
            return Err(QueryError::OutOfOrder {
                expected,
                got: page.page,
            });
        }

        self.pages.push(page);
        self.page_params.push(param);
        Ok(())
    }
}

impl<T> Default for InfiniteData<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Request state of an infinite query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// No request outstanding.
    Idle,
    /// A request for `page` is outstanding.
    Fetching { page: u32 },
}

/// Overall status, as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// No page loaded yet.
    Pending,
    /// The last request failed.
    Error,
    /// At least one page loaded and the last request succeeded.
    Success,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What asked for the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Explicit "load more".
    Manual,
    /// The viewport came within the threshold of the end of content.
    Proximity,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Proximity => "proximity",
        }
    }
}

/// Why a trigger did not issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A request is already outstanding.
    InFlight,
    /// The last page had no next page.
    Exhausted,
}

/// Result of a fetch trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and merged.
    Appended {
        /// The merged page number.
        page: u32,
        /// Items in that page.
        items: usize,
        /// Whether another page follows.
        has_more: bool,
    },
    /// No request was issued.
    Skipped(SkipReason),
}

impl FetchOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, Self::Appended { .. })
    }
}

struct State<T> {
    fetch: FetchState,
    data: InfiniteData<T>,
    last_error: Option<QueryError>,
    requests: u64,
}

struct Inner<S: PageSource> {
    key: QueryKey,
    source: S,
    cache: Option<Arc<dyn QueryCache>>,
    state: Mutex<State<S::Item>>,
}

/// Incremental accumulator over a [`PageSource`].
///
/// Cloning yields another handle to the same accumulation session.
pub struct InfiniteQuery<S: PageSource> {
    inner: Arc<Inner<S>>,
}

impl<S: PageSource> Clone for InfiniteQuery<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PageSource> InfiniteQuery<S> {
    /// Create an accumulator with no cache.
    pub fn new(key: QueryKey, source: S) -> Self {
        Self::from_parts(key, source, None, InfiniteData::new())
    }

    /// Create an accumulator that starts from, and writes back to, `cache`.
    ///
    /// Pages already cached under `key` (prefetched or hydrated) are not
    /// requested again.
    pub fn with_cache(key: QueryKey, source: S, cache: Arc<dyn QueryCache>) -> Self {
        let data = match cache.get_typed::<InfiniteData<S::Item>>(&key) {
            Ok(Some(data)) => {
                tracing::debug!(key = %key, pages = data.pages.len(), "seeded infinite query from cache");
                data
            }
            Ok(None) => InfiniteData::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "ignoring unreadable cached pages");
                InfiniteData::new()
            }
        };

        Self::from_parts(key, source, Some(cache), data)
    }

    fn from_parts(
        key: QueryKey,
        source: S,
        cache: Option<Arc<dyn QueryCache>>,
        data: InfiniteData<S::Item>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                key,
                source,
                cache,
                state: Mutex::new(State {
                    fetch: FetchState::Idle,
                    data,
                    last_error: None,
                    requests: 0,
                }),
            }),
        }
    }

    /// Fetch the next page now ("load more").
    ///
    /// Returns `Skipped` without issuing a request when a request is already
    /// outstanding or there are no more pages. A failed fetch leaves the
    /// accumulated pages and `has_more` untouched; call again to retry.
    pub async fn fetch_next_page(&self) -> Result<FetchOutcome, QueryError> {
        match self.begin(Trigger::Manual) {
            Ok(flight) => flight.run().await,
            Err(reason) => Ok(FetchOutcome::Skipped(reason)),
        }
    }

    /// Idle -> Fetching, if allowed.
    ///
    /// The returned [`InFlight`] puts the query back to `Idle` if it is
    /// dropped before the page completes.
    fn begin(&self, trigger: Trigger) -> Result<InFlight<S>, SkipReason> {
        let mut state = self.lock();

        if let FetchState::Fetching { page } = state.fetch {
            tracing::trace!(key = %self.inner.key, page, trigger = trigger.as_str(), "fetch already in flight");
            return Err(SkipReason::InFlight);
        }

        let param = state.data.next_page_param().ok_or(SkipReason::Exhausted)?;
        state.fetch = FetchState::Fetching { page: param };
        state.requests += 1;

        tracing::debug!(key = %self.inner.key, page = param, trigger = trigger.as_str(), "fetching page");
        Ok(InFlight {
            query: self.clone(),
            page: param,
            settled: false,
        })
    }

    /// Fetching -> Idle, merging the page on success.
    fn complete(
        &self,
        param: u32,
        result: Result<Page<S::Item>, QueryError>,
    ) -> Result<FetchOutcome, QueryError> {
        let mut state = self.lock();
        state.fetch = FetchState::Idle;

        let merged = result.and_then(|page| {
            let items = page.len();
            state.data.append(param, page)?;
            Ok(items)
        });

        let items = match merged {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key = %self.inner.key, page = param, error = %e, "page not merged");
                state.last_error = Some(e.clone());
                return Err(e);
            }
        };

        state.last_error = None;
        let has_more = state.data.has_more();

        // Under the state lock: snapshots reach the cache in page order.
        if let Some(cache) = &self.inner.cache {
            let written = serde_json::to_value(&state.data)
                .map_err(QueryError::from)
                .and_then(|value| cache.set(&self.inner.key, value).map_err(QueryError::from));
            if let Err(e) = written {
                tracing::warn!(key = %self.inner.key, error = %e, "failed to cache pages");
            }
        }
        drop(state);

        tracing::debug!(key = %self.inner.key, page = param, items, has_more, "merged page");
        Ok(FetchOutcome::Appended {
            page: param,
            items,
            has_more,
        })
    }

    pub fn key(&self) -> &QueryKey {
        &self.inner.key
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Copy of the accumulated data.
    pub fn data(&self) -> InfiniteData<S::Item> {
        self.lock().data.clone()
    }

    /// Copy of the accumulated pages.
    pub fn pages(&self) -> Vec<Page<S::Item>> {
        self.lock().data.pages.clone()
    }

    /// All items loaded so far, first-fetched first.
    pub fn items(&self) -> Vec<S::Item> {
        self.lock().data.items().cloned().collect()
    }

    /// Number of items loaded so far.
    pub fn loaded_count(&self) -> usize {
        self.lock().data.loaded_count()
    }

    /// Total items reported by the first page.
    pub fn total_items(&self) -> Option<usize> {
        self.lock().data.total_items()
    }

    /// Whether another page can be requested.
    pub fn has_more(&self) -> bool {
        self.lock().data.has_more()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.lock().fetch
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.fetch_state(), FetchState::Fetching { .. })
    }

    /// Error from the most recent request, cleared by the next success.
    pub fn last_error(&self) -> Option<QueryError> {
        self.lock().last_error.clone()
    }

    /// Number of requests issued by this session.
    pub fn requests(&self) -> u64 {
        self.lock().requests
    }

    pub fn status(&self) -> QueryStatus {
        let state = self.lock();
        if state.last_error.is_some() {
            QueryStatus::Error
        } else if state.data.pages.is_empty() {
            QueryStatus::Pending
        } else {
            QueryStatus::Success
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<S::Item>> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: PageSource + 'static> InfiniteQuery<S> {
    /// Request the next page in the background.
    ///
    /// Returns the spawned task when this call won the `Idle -> Fetching`
    /// transition, and `None` when a request is already outstanding, there
    /// are no more pages, or no tokio runtime is running.
    pub fn trigger(&self, trigger: Trigger) -> Option<JoinHandle<Result<FetchOutcome, QueryError>>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!(key = %self.inner.key, "trigger ignored outside a tokio runtime");
                return None;
            }
        };

        let flight = self.begin(trigger).ok()?;
        Some(runtime.spawn(flight.run()))
    }

    /// Subscribe this query to a proximity signal.
    ///
    /// Every near-end event calls [`trigger`](Self::trigger) with
    /// [`Trigger::Proximity`]. Dropping the subscription stops the wiring.
    pub fn bind(&self, signal: &ProximitySignal) -> Subscription {
        let query = self.clone();
        signal.on_near_end(move || {
            query.trigger(Trigger::Proximity);
        })
    }
}

/// An outstanding request won by [`InfiniteQuery::begin`].
///
/// Dropping it before the page completes (a timed-out or aborted future, a
/// panicking source) returns the query to `Idle` and records
/// [`QueryError::Cancelled`].
struct InFlight<S: PageSource> {
    query: InfiniteQuery<S>,
    page: u32,
    settled: bool,
}

impl<S: PageSource> InFlight<S> {
    async fn run(mut self) -> Result<FetchOutcome, QueryError> {
        let result = self.query.inner.source.fetch_page(self.page).await;
        self.settled = true;
        self.query.complete(self.page, result.map_err(QueryError::from))
    }
}

impl<S: PageSource> Drop for InFlight<S> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut state = self.query.lock();
        state.fetch = FetchState::Idle;
        state.last_error = Some(QueryError::Cancelled { page: self.page });
        tracing::warn!(key = %self.query.inner.key, page = self.page, "fetch dropped before completion");
    }
}
