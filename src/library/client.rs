//! HTTP content library client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{LibraryError, LibraryResult, LibraryRow, LibraryStore, SavePayload, SaveReceipt};
use crate::core::config::ApiConfig;
use crate::endpoint::{Endpoint, EndpointError};

impl From<EndpointError> for LibraryError {
    fn from(err: EndpointError) -> Self {
        match err {
            EndpointError::Http(e) => Self::Http(e),
            EndpointError::Status { status, message } => Self::Api { status, message },
        }
    }
}

/// Content library client backed by a remote HTTP service.
#[derive(Debug, Clone)]
pub struct HttpLibraryClient {
    endpoint: Endpoint,
}

impl HttpLibraryClient {
    /// Create a new library client.
    pub fn new(base_url: &str, timeout: Duration) -> LibraryResult<Self> {
        Ok(Self { endpoint: Endpoint::new(base_url, timeout)? })
    }

    /// Build from configuration. Returns `None` when no endpoint is configured.
    pub fn from_config(config: &ApiConfig) -> LibraryResult<Option<Self>> {
        let endpoint = Endpoint::from_config(&config.library_url, config)?;
        Ok(endpoint.map(|endpoint| Self { endpoint }))
    }

    /// Send a bearer token with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.endpoint = self.endpoint.with_api_key(api_key);
        self
    }
}

#[async_trait]
impl LibraryStore for HttpLibraryClient {
    async fn save(&self, payload: &SavePayload) -> LibraryResult<SaveReceipt> {
        let path = "content-library/save";
        tracing::debug!(
            url = %self.endpoint.url(path),
            title = %payload.title,
            "Saving to library"
        );

        let request = self.endpoint.post(path).json(payload);
        let response: SaveResponse = self.endpoint.send(request).await?.json().await?;

        if !response.success {
            return Err(LibraryError::SaveRejected(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(SaveReceipt { location: response.location, id: response.id })
    }

    async fn list(&self, organization_id: &str, limit: usize) -> LibraryResult<Vec<LibraryRow>> {
        let path = "content-library";
        let limit = limit.to_string();
        tracing::debug!(
            url = %self.endpoint.url(path),
            organization_id,
            %limit,
            "Fetching library"
        );

        let request = self
            .endpoint
            .get(path)
            .query(&[("organization_id", organization_id), ("limit", limit.as_str())]);
        let response: ListResponse = self.endpoint.send(request).await?.json().await?;

        Ok(response.into_rows())
    }
}

/// Save endpoint response.
#[derive(Debug, Deserialize)]
struct SaveResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Read endpoint response: a bare array or wrapped under `items`/`data`.
///
/// Rows are kept as raw JSON so one malformed row does not sink the page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Bare(Vec<serde_json::Value>),
    Items { items: Vec<serde_json::Value> },
    Data { data: Vec<serde_json::Value> },
}

impl ListResponse {
    fn into_rows(self) -> Vec<LibraryRow> {
        let raw = match self {
            Self::Bare(rows) | Self::Items { items: rows } | Self::Data { data: rows } => rows,
        };

        raw.into_iter()
            .filter_map(|value| match serde_json::from_value::<LibraryRow>(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed library row");
                    None
                }
            })
            .collect()
    }
}
