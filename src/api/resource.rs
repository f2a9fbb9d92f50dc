use crate::api::client::{ApiClient, ApiError};
use crate::api::envelope::ApiEnvelope;
use crate::models::EntityId;
use crate::services::fetch::{FetchError, Page, PageQuery, TableFetcher};
use crate::state::TableFilters;
use crate::utils::abort::AbortSignal;
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::info;

/// An entity exposed by the backend as a REST collection
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Collection path relative to the API base URL
    const PATH: &'static str;
    /// Human readable plural name
    const LABEL: &'static str;
    /// Wire names of the fields shown in list views, in display order
    const COLUMNS: &'static [&'static str];

    type Filters: TableFilters;
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;

    fn id(&self) -> EntityId;
}

/// CRUD calls for one resource collection
pub struct ResourceService<R> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        R::PATH
    }

    fn item_path(id: EntityId) -> String {
        format!("{}/{}", R::PATH, id)
    }

    /// `GET /{path}?page=&limit=&<filters>`
    pub async fn list(
        &self,
        query: &PageQuery<R::Filters>,
        signal: &AbortSignal,
    ) -> Result<Page<R>, ApiError> {
        let builder = self
            .client
            .request(Method::GET, R::PATH)
            .query(&[("page", query.page), ("limit", query.limit)])
            .query(&query.filters);

        let envelope: ApiEnvelope<Vec<R>> = self.client.send_cancellable(builder, signal).await?;
        let total = envelope.total();
        Ok(Page::new(envelope.data.unwrap_or_default(), total))
    }

    pub async fn get(&self, id: EntityId) -> Result<R, ApiError> {
        let builder = self.client.request(Method::GET, &Self::item_path(id));
        self.client.send(builder).await?.into_data()
    }

    pub async fn create(&self, dto: &R::Create) -> Result<R, ApiError> {
        let builder = self.client.request(Method::POST, R::PATH).json(dto);
        let created: R = self.client.send(builder).await?.into_data()?;
        info!(target: "api", resource = R::PATH, id = created.id(), "Created");
        Ok(created)
    }

    pub async fn update(&self, id: EntityId, dto: &R::Update) -> Result<R, ApiError> {
        let builder = self
            .client
            .request(Method::PUT, &Self::item_path(id))
            .json(dto);
        let updated = self.client.send(builder).await?.into_data()?;
        info!(target: "api", resource = R::PATH, id, "Updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), ApiError> {
        let builder = self.client.request(Method::DELETE, &Self::item_path(id));
        // Some endpoints echo the deleted row, some send nothing
        let _: ApiEnvelope<serde_json::Value> = self.client.send(builder).await?;
        info!(target: "api", resource = R::PATH, id, "Deleted");
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> TableFetcher<R, R::Filters> for ResourceService<R> {
    async fn fetch(
        &self,
        query: PageQuery<R::Filters>,
        signal: AbortSignal,
    ) -> Result<Page<R>, FetchError> {
        self.list(&query, &signal).await.map_err(FetchError::from)
    }
}
