//! Table state management
//!
//! This module contains the per-table UI state, the keyed store that owns
//! it, the typed filters each table carries, and the change events the
//! store broadcasts.

pub mod events;
pub mod filters;
pub mod table_state;
pub mod table_store;

pub use events::{TableChange, TableEvent};
pub use filters::{FilterError, FilterMap, FilterValue, NoFilters, TableFilters};
pub use table_state::{total_pages, InitialTableState, TableState, DEFAULT_PAGE_SIZE};
pub use table_store::TableStore;
