//! Table state change notifications

/// What changed in a table's state
#[derive(Debug, Clone, PartialEq)]
pub enum TableChange {
    Initialized,
    /// Rows replaced; carries the new row count
    Data(usize),
    Loading(bool),
    Error(bool),
    Filters,
    Page(u32),
    Limit(u32),
    TotalItems(u64),
}

/// A change to the table registered under `key`
#[derive(Debug, Clone, PartialEq)]
pub struct TableEvent {
    pub key: String,
    pub change: TableChange,
}

impl TableEvent {
    pub fn new(key: &str, change: TableChange) -> Self {
        Self {
            key: key.to_string(),
            change,
        }
    }

    /// Whether a list view needs to redraw its rows (as opposed to just
    /// its status line)
    pub fn affects_rows(&self) -> bool {
        matches!(
            self.change,
            TableChange::Initialized | TableChange::Data(_) | TableChange::Error(_)
        )
    }
}
