use crate::api::{ApiClient, Resource, ResourceService};
use crate::config::Config;
use crate::services::{TableController, TableOptions};
use crate::state::{InitialTableState, TableStore};
use anyhow::Result;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Shared services for the admin screens.
///
/// Holds the API client and one `TableStore` per resource type, so every
/// view of the same resource reads and writes the same table states.
/// Clones share the stores.
#[derive(Clone)]
pub struct ServiceContainer {
    client: ApiClient,
    debounce: Duration,
    default_limit: u32,
    stores: Arc<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl ServiceContainer {
    pub fn new(client: ApiClient) -> Self {
        let defaults = Config::default();
        Self {
            client,
            debounce: defaults.tables.debounce(),
            default_limit: defaults.tables.default_limit,
            stores: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Build the client and table defaults from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = ApiClient::with_timeout(&config.api.base_url, config.api.timeout())?;
        if let Some(token) = &config.api.token {
            client = client.with_token(token.clone());
        }

        Ok(Self::new(client)
            .with_debounce(config.tables.debounce())
            .with_default_limit(config.tables.default_limit))
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn service<R: Resource>(&self) -> ResourceService<R> {
        ResourceService::new(self.client.clone())
    }

    /// The store holding every table of resource `R`, created on first use
    pub fn store<R: Resource>(&self) -> TableStore<R, R::Filters> {
        let mut stores = self.stores.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = stores
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.downcast_ref::<TableStore<R, R::Filters>>())
        {
            return store.clone();
        }

        debug!(target: "table", resource = R::PATH, "Creating table store");
        let store = TableStore::<R, R::Filters>::new();
        stores.insert(TypeId::of::<R>(), Box::new(store.clone()));
        store
    }

    /// Table options for a new controller: configured debounce and page size
    pub fn table_options<R: Resource>(&self) -> TableOptions<R::Filters> {
        TableOptions::default()
            .with_debounce(self.debounce)
            .with_initial(InitialTableState::new().limit(self.default_limit))
    }

    /// Controller for table `key`, fetching through `service::<R>()`
    pub fn controller<R: Resource>(&self, key: &str) -> TableController<R, R::Filters> {
        self.controller_with::<R>(key, self.table_options::<R>())
    }

    pub fn controller_with<R: Resource>(
        &self,
        key: &str,
        options: TableOptions<R::Filters>,
    ) -> TableController<R, R::Filters> {
        TableController::new(key, self.store::<R>(), self.service::<R>(), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Menu, Role};

    #[test]
    fn test_stores_are_shared_per_resource() {
        let container = ServiceContainer::new(ApiClient::new("http://localhost:3000/api"));
        let clone = container.clone();

        container.store::<Role>().init_table("roles", None);
        assert!(clone.store::<Role>().contains("roles"));
        assert!(!container.store::<Menu>().contains("roles"));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.api.base_url = "http://pos.test/api/".into();
        config.tables.default_limit = 25;

        let container = ServiceContainer::from_config(&config).unwrap();
        assert_eq!(container.client().base_url(), "http://pos.test/api");
        assert_eq!(container.service::<Role>().path(), "roles");

        let options = container.table_options::<Role>();
        assert_eq!(options.debounce, Duration::from_millis(300));
        assert_eq!(options.initial.map(|i| i.limit), Some(Some(25)));
    }
}
