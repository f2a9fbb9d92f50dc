//! The contract between a table controller and whatever loads its rows

use crate::utils::abort::AbortSignal;
use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;

/// Parameters of one page request
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery<F> {
    pub page: u32,
    pub limit: u32,
    pub filters: F,
}

/// One page of rows plus the server-side row count
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    /// Total rows across all pages, when the server reports it
    pub total: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: Option<u64>) -> Self {
        Self { data, total }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request was aborted because a newer one replaced it
    #[error("request cancelled")]
    Cancelled,
    #[error("request failed: {0}")]
    Failed(String),
}

impl FetchError {
    pub fn failed(reason: impl Display) -> Self {
        FetchError::Failed(reason.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Loads one page of rows for a table.
///
/// Implementations should stop work and return `FetchError::Cancelled` once
/// `signal` is aborted. Ignoring the signal is safe (a superseded result is
/// discarded anyway) but wastes the request.
#[async_trait]
pub trait TableFetcher<T, F>: Send + Sync {
    async fn fetch(&self, query: PageQuery<F>, signal: AbortSignal) -> Result<Page<T>, FetchError>;
}

#[async_trait]
impl<T, F, Func, Fut> TableFetcher<T, F> for Func
where
    T: Send + 'static,
    F: Send + 'static,
    Func: Fn(PageQuery<F>, AbortSignal) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, FetchError>> + Send,
{
    async fn fetch(&self, query: PageQuery<F>, signal: AbortSignal) -> Result<Page<T>, FetchError> {
        (self)(query, signal).await
    }
}
