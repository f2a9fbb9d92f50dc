use crate::api::envelope::{ApiEnvelope, ApiMeta};
use crate::services::fetch::FetchError;
use crate::utils::abort::AbortSignal;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response contained no data")]
    MissingData,
    #[error("request cancelled")]
    Cancelled,
}

impl From<ApiError> for FetchError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Cancelled => FetchError::Cancelled,
            other => FetchError::failed(other),
        }
    }
}

/// HTTP client for the cafe backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            token: None,
        }
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        trace!(target: "api", %method, %url, "Building request");
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and unwrap the response envelope.
    ///
    /// Non-2xx statuses and envelopes flagged with `meta.error` become
    /// `ApiError::Status`, carrying the server's message when it sent one.
    pub async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;
        debug!(target: "api", %url, status = status.as_u16(), bytes = body.len(), "Response received");

        if !status.is_success() {
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
                .map(|envelope| envelope.meta.message)
                .ok()
                .filter(|message| !message.is_empty())
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or(body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        // 204 and friends
        if body.trim().is_empty() {
            return Ok(ApiEnvelope {
                meta: ApiMeta {
                    status: status.as_u16(),
                    ..ApiMeta::default()
                },
                data: None,
            });
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        if envelope.meta.error {
            return Err(ApiError::Status {
                status: envelope.meta.status,
                message: envelope.meta.message,
            });
        }
        Ok(envelope)
    }

    /// Like `send`, but gives up with `ApiError::Cancelled` once `signal` aborts
    pub async fn send_cancellable<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        signal: &AbortSignal,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        if signal.is_aborted() {
            return Err(ApiError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = signal.aborted() => Err(ApiError::Cancelled),
            result = self.send(builder) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:3000/api/");
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert_eq!(client.url("roles"), "http://localhost:3000/api/roles");
        assert_eq!(client.url("/roles/4"), "http://localhost:3000/api/roles/4");
    }

    #[test]
    fn test_cancelled_maps_to_fetch_cancelled() {
        assert_eq!(FetchError::from(ApiError::Cancelled), FetchError::Cancelled);
        assert_eq!(
            FetchError::from(ApiError::Status {
                status: 500,
                message: "boom".into()
            }),
            FetchError::Failed("server returned 500: boom".into())
        );
    }
}
