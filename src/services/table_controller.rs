//! Keeps one table's rows in sync with its page, limit and filters
//!
//! The controller sits between a list view and its `TableFetcher`:
//!
//! - parameter changes are debounced, so a burst of page clicks or
//!   keystrokes issues one request;
//! - a request identical to the one already in flight is skipped;
//! - a newer request aborts the older one through its `AbortSignal`;
//! - every request takes a sequence number, and only the response to the
//!   most recently issued request is ever written to the store. A slow
//!   response that arrives after a newer one cannot overwrite it, even when
//!   the fetcher ignores the abort signal.

use crate::debouncer::Debouncer;
use crate::services::fetch::{FetchError, Page, PageQuery, TableFetcher};
use crate::state::{InitialTableState, TableFilters, TableState, TableStore};
use crate::trace_fetch;
use crate::utils::abort::AbortController;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Quiet period before a parameter change turns into a request
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// How a table controller is set up
#[derive(Debug, Clone)]
pub struct TableOptions<F> {
    pub debounce: Duration,
    /// Overrides applied if the table is not registered yet
    pub initial: Option<InitialTableState<F>>,
}

impl<F> Default for TableOptions<F> {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            initial: None,
        }
    }
}

impl<F> TableOptions<F> {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_initial(mut self, initial: InitialTableState<F>) -> Self {
        self.initial = Some(initial);
        self
    }
}

/// What happened to a fetch cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows were written to the store
    Applied { rows: usize, total: u64 },
    /// The fetcher failed; the store now shows the error state
    Failed(String),
    /// The fetch was aborted
    Cancelled,
    /// A newer request was issued before this one completed
    Stale,
    /// An identical request was already in flight
    Duplicate,
    /// The table is not registered in the store
    Unregistered,
}

struct InFlight {
    composite: String,
    seq: u64,
    abort: AbortController,
}

#[derive(Default)]
struct FetchTracker {
    in_flight: Option<InFlight>,
    /// Sequence number of the most recently issued request
    latest_seq: u64,
}

struct Shared<T, F> {
    key: String,
    store: TableStore<T, F>,
    fetcher: Arc<dyn TableFetcher<T, F>>,
    tracker: Mutex<FetchTracker>,
}

/// Releases the in-flight slot if a fetch cycle is dropped mid-request,
/// e.g. when the caller of `refresh` times out
struct CycleGuard<'a, T, F>
where
    T: Clone + Send + Sync + 'static,
    F: TableFilters,
{
    shared: &'a Shared<T, F>,
    seq: u64,
    armed: bool,
}

impl<T, F> Drop for CycleGuard<'_, T, F>
where
    T: Clone + Send + Sync + 'static,
    F: TableFilters,
{
    fn drop(&mut self) {
        if self.armed {
            self.shared.abandon(self.seq);
        }
    }
}

impl<T, F> Shared<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: TableFilters,
{
    fn tracker(&self) -> MutexGuard<'_, FetchTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn composite_key(&self, state: &TableState<T, F>) -> String {
        format!(
            "{}:{}:{}:{}",
            self.key,
            state.page,
            state.limit,
            state.filters.fingerprint()
        )
    }

    /// Run one fetch cycle against the current table parameters.
    ///
    /// `force` re-issues the request even if an identical one is in flight.
    async fn run(self: Arc<Self>, force: bool) -> FetchOutcome {
        let Some(state) = self.store.get(&self.key) else {
            warn!(target: "fetch", table = %self.key, "Fetch requested for unregistered table");
            return FetchOutcome::Unregistered;
        };
        let composite = self.composite_key(&state);

        let (seq, signal) = {
            let mut tracker = self.tracker();
            if let Some(in_flight) = &tracker.in_flight {
                if in_flight.composite == composite && !force {
                    debug!(target: "fetch", request = %composite, "Identical request already in flight");
                    return FetchOutcome::Duplicate;
                }
                debug!(target: "fetch", request = %in_flight.composite, "Aborting superseded request");
                in_flight.abort.abort();
            }

            tracker.latest_seq += 1;
            let seq = tracker.latest_seq;
            let abort = AbortController::new();
            let signal = abort.signal();
            tracker.in_flight = Some(InFlight {
                composite: composite.clone(),
                seq,
                abort,
            });
            self.store.set_loading(&self.key, true);
            (seq, signal)
        };

        trace_fetch!(self.key, composite);
        let TableState {
            page,
            limit,
            filters,
            ..
        } = state;
        let mut guard = CycleGuard {
            shared: &*self,
            seq,
            armed: true,
        };
        let result = self
            .fetcher
            .fetch(PageQuery { page, limit, filters }, signal)
            .await;
        guard.armed = false;

        self.settle(seq, &composite, result)
    }

    /// Clean up after a fetch cycle whose future was dropped before it settled
    fn abandon(&self, seq: u64) {
        let mut tracker = self.tracker();
        if tracker.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
            if let Some(in_flight) = tracker.in_flight.take() {
                debug!(target: "fetch", request = %in_flight.composite, "Fetch abandoned, aborting request");
                in_flight.abort.abort();
            }
        }
        if tracker.latest_seq == seq {
            self.store.set_loading(&self.key, false);
        }
    }

    /// Apply a finished request to the store if it is still the latest one
    fn settle(
        &self,
        seq: u64,
        composite: &str,
        result: Result<Page<T>, FetchError>,
    ) -> FetchOutcome {
        // Held while writing to the store so a newer request cannot start
        // between the staleness check and the write.
        let mut tracker = self.tracker();
        if tracker.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
            tracker.in_flight = None;
        }
        let is_latest = tracker.latest_seq == seq;

        match result {
            Err(FetchError::Cancelled) => {
                debug!(target: "fetch", request = composite, "Request cancelled");
                if is_latest {
                    self.store.set_loading(&self.key, false);
                }
                FetchOutcome::Cancelled
            }
            _ if !is_latest => {
                debug!(
                    target: "fetch",
                    request = composite,
                    seq,
                    latest = tracker.latest_seq,
                    "Discarding stale response"
                );
                FetchOutcome::Stale
            }
            Ok(page) => {
                let rows = page.data.len();
                let total = page.total.unwrap_or(0);
                self.store.set_data(&self.key, page.data);
                self.store.set_total_items(&self.key, total);
                self.store.set_error(&self.key, false);
                self.store.set_loading(&self.key, false);
                info!(target: "fetch", table = %self.key, rows, total, "Loaded page");
                FetchOutcome::Applied { rows, total }
            }
            Err(FetchError::Failed(reason)) => {
                warn!(target: "fetch", table = %self.key, request = composite, %reason, "Fetch failed");
                self.store.set_error(&self.key, true);
                self.store.set_data(&self.key, Vec::new());
                self.store.set_loading(&self.key, false);
                FetchOutcome::Failed(reason)
            }
        }
    }
}

/// Drives the data of one table registered in a `TableStore`.
///
/// Creating a controller registers the table (if needed) and schedules the
/// first fetch; dropping it cancels the pending timer and aborts the
/// request in flight. The store keeps the table's state either way.
pub struct TableController<T, F> {
    shared: Arc<Shared<T, F>>,
    debouncer: Mutex<Debouncer>,
}

impl<T, F> TableController<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: TableFilters,
{
    /// Must be called from within a Tokio runtime.
    pub fn new<Fetch>(
        key: impl Into<String>,
        store: TableStore<T, F>,
        fetcher: Fetch,
        options: TableOptions<F>,
    ) -> Self
    where
        Fetch: TableFetcher<T, F> + 'static,
    {
        Self::with_shared_fetcher(key, store, Arc::new(fetcher), options)
    }

    pub fn with_shared_fetcher(
        key: impl Into<String>,
        store: TableStore<T, F>,
        fetcher: Arc<dyn TableFetcher<T, F>>,
        options: TableOptions<F>,
    ) -> Self {
        let key = key.into();
        store.init_table(&key, options.initial);

        let controller = Self {
            shared: Arc::new(Shared {
                key,
                store,
                fetcher,
                tracker: Mutex::new(FetchTracker::default()),
            }),
            debouncer: Mutex::new(Debouncer::with_delay(options.debounce)),
        };
        controller.schedule();
        controller
    }

    fn debouncer(&self) -> MutexGuard<'_, Debouncer> {
        self.debouncer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule(&self) {
        let shared = Arc::clone(&self.shared);
        self.debouncer().trigger(async move {
            shared.run(false).await;
        });
    }

    /// Page, limit and filter fingerprint: the inputs a fetch depends on
    fn fetch_params(&self) -> Option<(u32, u32, String)> {
        self.shared
            .store
            .get(&self.shared.key)
            .map(|state| (state.page, state.limit, state.filters.fingerprint()))
    }

    /// Apply a store mutation and schedule a fetch if the fetch inputs changed
    fn change_params(&self, mutate: impl FnOnce(&TableStore<T, F>, &str)) {
        let before = self.fetch_params();
        mutate(&self.shared.store, &self.shared.key);
        if self.fetch_params() != before {
            self.schedule();
        }
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn store(&self) -> &TableStore<T, F> {
        &self.shared.store
    }

    /// Snapshot of the table's current state
    pub fn state(&self) -> TableState<T, F> {
        self.shared.store.get_or_default(&self.shared.key)
    }

    pub fn set_page(&self, page: u32) {
        self.change_params(|store, key| store.set_page(key, page));
    }

    /// Change the page size; goes back to the first page
    pub fn set_limit(&self, limit: u32) {
        self.change_params(|store, key| store.set_limit(key, limit));
    }

    /// Merge `patch` into the current filters; goes back to the first page.
    ///
    /// Blank text values in `patch` clear the matching filter.
    pub fn set_filters(&self, patch: F) {
        let mut filters = self.state().filters;
        filters.merge(patch);
        self.replace_filters(filters);
    }

    /// Replace the filters wholesale; goes back to the first page
    pub fn replace_filters(&self, filters: F) {
        self.change_params(|store, key| store.set_filters(key, filters));
    }

    /// Show `rows` without fetching them
    pub fn set_data(&self, rows: Vec<T>) {
        self.shared.store.set_data(&self.shared.key, rows);
    }

    /// Advance one page if there is one
    pub fn next_page(&self) -> bool {
        let state = self.state();
        if state.has_next_page() {
            self.set_page(state.page + 1);
            true
        } else {
            false
        }
    }

    /// Go back one page if there is one
    pub fn prev_page(&self) -> bool {
        let state = self.state();
        if state.has_prev_page() {
            self.set_page(state.page - 1);
            true
        } else {
            false
        }
    }

    /// Fetch the current page now, skipping the debounce, and wait for it.
    ///
    /// An identical request already in flight is aborted and re-issued.
    pub async fn refresh(&self) -> FetchOutcome {
        self.debouncer().reset();
        Arc::clone(&self.shared).run(true).await
    }

    /// A debounced fetch is waiting to fire
    pub fn is_pending(&self) -> bool {
        self.debouncer().is_pending()
    }

    /// A request has been issued and not settled yet
    pub fn is_fetching(&self) -> bool {
        self.shared.tracker().in_flight.is_some()
    }
}

impl<T, F> Drop for TableController<T, F> {
    fn drop(&mut self) {
        self.debouncer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();

        let tracker = self
            .shared
            .tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(in_flight) = &tracker.in_flight {
            debug!(target: "fetch", request = %in_flight.composite, "Controller dropped, aborting request");
            in_flight.abort.abort();
        }
    }
}
