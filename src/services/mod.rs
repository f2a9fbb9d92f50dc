pub mod fetch;
pub mod table_controller;

pub use fetch::{FetchError, Page, PageQuery, TableFetcher};
pub use table_controller::{FetchOutcome, TableController, TableOptions, DEFAULT_DEBOUNCE_MS};
