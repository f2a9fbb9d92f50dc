use crate::state::events::{TableChange, TableEvent};
use crate::state::filters::TableFilters;
use crate::state::table_state::{InitialTableState, TableState};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Buffered change notifications per store before slow subscribers lag
const EVENT_CAPACITY: usize = 256;

/// Keyed registry of table state.
///
/// Every list view registers its state under its own key so independent
/// views never collide, and the state outlives the view itself (a view can
/// be torn down and rebuilt without losing its page or filters). Cloning the
/// store hands out another handle to the same registry.
///
/// Setters on a key that was never initialized are no-ops.
pub struct TableStore<T, F> {
    instances: Arc<Mutex<HashMap<String, TableState<T, F>>>>,
    events: broadcast::Sender<TableEvent>,
}

impl<T, F> Clone for TableStore<T, F> {
    fn clone(&self) -> Self {
        Self {
            instances: Arc::clone(&self.instances),
            events: self.events.clone(),
        }
    }
}

impl<T, F> Default for TableStore<T, F>
where
    T: Clone + Send + 'static,
    F: TableFilters,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> TableStore<T, F>
where
    T: Clone + Send + 'static,
    F: TableFilters,
{
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            instances: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, TableState<T, F>>> {
        self.instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `update` to the entry under `key` and broadcast the resulting change
    fn update(
        &self,
        key: &str,
        update: impl FnOnce(&mut TableState<T, F>) -> TableChange,
    ) -> bool {
        let change = {
            let mut instances = self.lock();
            match instances.get_mut(key) {
                Some(state) => update(state),
                None => {
                    debug!(target: "table", table = key, "Ignoring update for unregistered table");
                    return false;
                }
            }
        };
        trace!(target: "table", table = key, ?change, "Table state updated");
        self.emit(key, change);
        true
    }

    fn emit(&self, key: &str, change: TableChange) {
        // No subscribers is fine
        let _ = self.events.send(TableEvent::new(key, change));
    }

    /// Register a table. Does nothing if `key` already exists.
    ///
    /// Returns true if a new entry was created.
    pub fn init_table(&self, key: &str, initial: Option<InitialTableState<F>>) -> bool {
        {
            let mut instances = self.lock();
            if instances.contains_key(key) {
                return false;
            }
            let state = TableState::from_initial(initial.unwrap_or_default());
            debug!(
                target: "table",
                table = key,
                page = state.page,
                limit = state.limit,
                "Registered table"
            );
            instances.insert(key.to_string(), state);
        }
        self.emit(key, TableChange::Initialized);
        true
    }

    pub fn set_data(&self, key: &str, rows: Vec<T>) {
        self.update(key, |state| {
            state.data = rows;
            TableChange::Data(state.data.len())
        });
    }

    pub fn set_loading(&self, key: &str, loading: bool) {
        self.update(key, |state| {
            state.loading = loading;
            TableChange::Loading(loading)
        });
    }

    pub fn set_error(&self, key: &str, error: bool) {
        self.update(key, |state| {
            state.error = error;
            TableChange::Error(error)
        });
    }

    /// Replace the filters wholesale and go back to the first page
    pub fn set_filters(&self, key: &str, filters: F) {
        self.update(key, |state| {
            state.filters = filters.normalized();
            state.page = 1;
            TableChange::Filters
        });
    }

    pub fn set_page(&self, key: &str, page: u32) {
        self.update(key, |state| {
            state.page = page.max(1);
            TableChange::Page(state.page)
        });
    }

    /// Change the page size and go back to the first page
    pub fn set_limit(&self, key: &str, limit: u32) {
        self.update(key, |state| {
            state.limit = limit.max(1);
            state.page = 1;
            state.recompute_total_pages();
            TableChange::Limit(state.limit)
        });
    }

    /// Record the server-side row count and recompute the page count
    pub fn set_total_items(&self, key: &str, total: u64) {
        self.update(key, |state| {
            state.total_items = total;
            state.recompute_total_pages();
            TableChange::TotalItems(total)
        });
    }

    /// Snapshot of the table under `key`
    pub fn get(&self, key: &str) -> Option<TableState<T, F>> {
        self.lock().get(key).cloned()
    }

    /// Snapshot of the table under `key`, or the default state if unregistered
    pub fn get_or_default(&self, key: &str) -> TableState<T, F> {
        self.get(key).unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Receive every change made to any table in this store
    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.events.subscribe()
    }
}
