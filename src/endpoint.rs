//! Shared plumbing for the remote JSON endpoints.
//!
//! Each service client wraps an [`Endpoint`] and maps [`EndpointError`]
//! into its own error type.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};

use crate::core::config::ApiConfig;

/// Transport-level failures shared by every endpoint.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },
}

/// A base URL with its HTTP client and optional bearer token.
#[derive(Debug, Clone)]
pub struct Endpoint {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl Endpoint {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EndpointError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Build for one of the configured URLs. `None` when the URL is empty.
    pub fn from_config(base_url: &str, config: &ApiConfig) -> Result<Option<Self>, EndpointError> {
        if base_url.trim().is_empty() {
            return Ok(None);
        }

        let endpoint = Self::new(base_url, config.timeout())?;
        Ok(Some(match config.api_key() {
            Some(key) => endpoint.with_api_key(key),
            None => endpoint,
        }))
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    /// Authorize and send a request, turning non-2xx answers into errors.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, EndpointError> {
        let request = match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        };

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Err(EndpointError::Status { status, message })
    }
}
