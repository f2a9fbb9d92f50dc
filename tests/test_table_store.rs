use anyhow::Result;
use cafe_admin::models::people::RoleFilters;
use cafe_admin::models::Role;
use cafe_admin::state::{
    total_pages, FilterMap, InitialTableState, TableChange, TableStore, DEFAULT_PAGE_SIZE,
};

fn role(id: u64, name: &str) -> Role {
    Role {
        id,
        name: name.to_string(),
        description: None,
        permissions: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn test_init_table_defaults() -> Result<()> {
    let store: TableStore<Role, RoleFilters> = TableStore::new();
    assert!(store.init_table("roles", None));

    let state = store.get("roles").expect("registered");
    assert_eq!(state.page, 1);
    assert_eq!(state.limit, DEFAULT_PAGE_SIZE);
    assert_eq!(state.total_pages, 0);
    assert_eq!(state.total_items, 0);
    assert!(state.data.is_empty());
    assert!(!state.loading);
    assert!(!state.error);
    assert_eq!(state.filters, RoleFilters::default());
    Ok(())
}

#[test]
fn test_init_table_twice_keeps_state() -> Result<()> {
    let store: TableStore<Role, RoleFilters> = TableStore::new();
    store.init_table("roles", Some(InitialTableState::new().limit(20)));
    store.set_page("roles", 3);
    store.set_data("roles", vec![role(1, "admin")]);

    assert!(!store.init_table("roles", Some(InitialTableState::new().limit(50))));

    let state = store.get_or_default("roles");
    assert_eq!(state.page, 3);
    assert_eq!(state.limit, 20);
    assert_eq!(state.data.len(), 1);
    Ok(())
}

#[test]
fn test_initial_overrides_are_normalized() -> Result<()> {
    let store: TableStore<Role, RoleFilters> = TableStore::new();
    let initial = InitialTableState::new().page(0).limit(0).filters(RoleFilters {
        search: Some("   ".into()),
    });
    store.init_table("roles", Some(initial));

    let state = store.get_or_default("roles");
    assert_eq!(state.page, 1);
    assert_eq!(state.limit, 1);
    assert_eq!(state.filters.search, None);
    Ok(())
}

#[test]
fn test_filters_and_limit_reset_page() -> Result<()> {
    let store: TableStore<Role, RoleFilters> = TableStore::new();
    store.init_table("roles", None);

    store.set_page("roles", 4);
    store.set_filters(
        "roles",
        RoleFilters {
            search: Some("admin".into()),
        },
    );
    let state = store.get_or_default("roles");
    assert_eq!(state.page, 1);
    assert_eq!(state.filters.search.as_deref(), Some("admin"));

    store.set_page("roles", 5);
    store.set_limit("roles", 50);
    let state = store.get_or_default("roles");
    assert_eq!(state.page, 1);
    assert_eq!(state.limit, 50);
    Ok(())
}

#[test]
fn test_total_pages_tracks_total_and_limit() -> Result<()> {
    let store: TableStore<u32, FilterMap> = TableStore::new();
    store.init_table("orders", None);

    let steps: [(&str, u64); 8] = [
        ("total", 95),
        ("limit", 20),
        ("page", 3),
        ("filters", 0),
        ("total", 0),
        ("limit", 7),
        ("total", 1),
        ("total", 100),
    ];

    for (step, value) in steps {
        match step {
            "total" => store.set_total_items("orders", value),
            "limit" => store.set_limit("orders", value as u32),
            "page" => store.set_page("orders", value as u32),
            _ => store.set_filters("orders", FilterMap::new().with("status", "PAID")),
        }
        let state = store.get_or_default("orders");
        assert_eq!(
            state.total_pages,
            total_pages(state.total_items, state.limit),
            "after {step}={value}"
        );
        assert_eq!(
            u64::from(state.total_pages),
            state.total_items.div_ceil(u64::from(state.limit))
        );
    }

    let state = store.get_or_default("orders");
    assert_eq!(state.limit, 7);
    assert_eq!(state.total_pages, 15);
    Ok(())
}

#[test]
fn test_unknown_key_is_noop() -> Result<()> {
    let store: TableStore<u32, FilterMap> = TableStore::new();
    store.set_page("missing", 2);
    store.set_data("missing", vec![1, 2, 3]);
    store.set_loading("missing", true);

    assert!(!store.contains("missing"));
    assert!(store.is_empty());
    assert_eq!(store.get_or_default("missing").page, 1);
    Ok(())
}

#[test]
fn test_keys_are_independent() -> Result<()> {
    let store: TableStore<u32, FilterMap> = TableStore::new();
    store.init_table("orders:today", None);
    store.init_table("orders:all", None);

    store.set_data("orders:today", vec![1, 2]);
    store.set_error("orders:all", true);

    assert_eq!(store.keys(), vec!["orders:all", "orders:today"]);
    assert_eq!(store.get_or_default("orders:today").data, vec![1, 2]);
    assert!(!store.get_or_default("orders:today").error);
    assert!(store.get_or_default("orders:all").data.is_empty());
    assert!(store.get_or_default("orders:all").error);
    Ok(())
}

#[test]
fn test_clones_share_entries_and_events() -> Result<()> {
    let store: TableStore<u32, FilterMap> = TableStore::new();
    let mut events = store.subscribe();
    let handle = store.clone();

    handle.init_table("tables", None);
    handle.set_total_items("tables", 12);

    assert!(store.contains("tables"));
    assert_eq!(store.get_or_default("tables").total_items, 12);

    let first = events.try_recv()?;
    assert_eq!(first.key, "tables");
    assert_eq!(first.change, TableChange::Initialized);
    assert_eq!(events.try_recv()?.change, TableChange::TotalItems(12));
    Ok(())
}
