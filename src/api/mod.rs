//! REST client for the cafe backend
//!
//! `ApiClient` handles transport and the `{ meta, data }` envelope;
//! `ResourceService` adds typed CRUD calls per collection and doubles as the
//! fetcher behind a `TableController`.

pub mod client;
pub mod envelope;
pub mod resource;

pub use client::{ApiClient, ApiError};
pub use envelope::{ApiEnvelope, ApiMeta, PageMeta};
pub use resource::{Resource, ResourceService};
