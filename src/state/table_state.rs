use crate::state::filters::TableFilters;

/// Page size used when a table does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// UI state of one paginated list view
#[derive(Debug, Clone, PartialEq)]
pub struct TableState<T, F> {
    /// Rows of the current page
    pub data: Vec<T>,
    /// A fetch is outstanding
    pub loading: bool,
    /// The most recently completed fetch failed
    pub error: bool,
    pub filters: F,
    /// Current page, 1-indexed
    pub page: u32,
    /// Page size
    pub limit: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl<T, F: Default> Default for TableState<T, F> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: false,
            filters: F::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            total_pages: 0,
            total_items: 0,
        }
    }
}

impl<T, F: TableFilters> TableState<T, F> {
    /// Build the starting state of a table from defaults plus overrides
    pub fn from_initial(initial: InitialTableState<F>) -> Self {
        let mut state = Self::default();
        if let Some(page) = initial.page {
            state.page = page.max(1);
        }
        if let Some(limit) = initial.limit {
            state.limit = limit.max(1);
        }
        if let Some(filters) = initial.filters {
            state.filters = filters.normalized();
        }
        state
    }
}

impl<T, F> TableState<T, F> {
    pub fn recompute_total_pages(&mut self) {
        self.total_pages = total_pages(self.total_items, self.limit);
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }

    /// 1-indexed position of the first and last row of the current page
    pub fn row_range(&self) -> Option<(u64, u64)> {
        if self.data.is_empty() {
            return None;
        }
        let first = u64::from(self.page.saturating_sub(1)) * u64::from(self.limit) + 1;
        Some((first, first + self.data.len() as u64 - 1))
    }
}

/// Number of pages needed for `total_items` rows at `limit` rows per page
pub fn total_pages(total_items: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    let pages = total_items.div_ceil(u64::from(limit));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Overrides applied when a table is first registered
#[derive(Debug, Clone)]
pub struct InitialTableState<F> {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub filters: Option<F>,
}

impl<F> Default for InitialTableState<F> {
    fn default() -> Self {
        Self {
            page: None,
            limit: None,
            filters: None,
        }
    }
}

impl<F> InitialTableState<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(mut self, filters: F) -> Self {
        self.filters = Some(filters);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::filters::FilterMap;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 20), 5);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_from_initial_clamps_and_normalizes() {
        let state: TableState<u32, FilterMap> = TableState::from_initial(
            InitialTableState::new()
                .page(0)
                .limit(25)
                .filters(FilterMap::new().with("search", "mocha")),
        );
        assert_eq!(state.page, 1);
        assert_eq!(state.limit, 25);
        assert_eq!(state.filters, FilterMap::new().with("search", "mocha"));
        assert!(!state.loading);
        assert!(state.data.is_empty());
    }

    #[test]
    fn test_row_range() {
        let mut state: TableState<u32, FilterMap> = TableState::default();
        assert_eq!(state.row_range(), None);

        state.page = 3;
        state.limit = 10;
        state.data = vec![1, 2, 3, 4];
        assert_eq!(state.row_range(), Some((21, 24)));
    }

    #[test]
    fn test_page_navigation_flags() {
        let mut state: TableState<u32, FilterMap> = TableState::default();
        state.total_items = 25;
        state.recompute_total_pages();
        assert_eq!(state.total_pages, 3);
        assert!(state.has_next_page());
        assert!(!state.has_prev_page());

        state.page = 3;
        assert!(!state.has_next_page());
        assert!(state.has_prev_page());
    }
}
