//! HTTP generation gateway.
//!
//! Implements [`GenerationGateway`] against a JSON endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{
    AdaptationRequest, AdaptedVersion, GatewayError, GeneratedContent, GenerationGateway,
    GenerationRequest,
};
use crate::core::config::ApiConfig;
use crate::endpoint::{Endpoint, EndpointError};

impl From<EndpointError> for GatewayError {
    fn from(err: EndpointError) -> Self {
        match err {
            EndpointError::Http(e) => Self::Http(e),
            EndpointError::Status { status, message } => Self::Api { status, message },
        }
    }
}

/// Generation gateway backed by a remote HTTP service.
#[derive(Debug, Clone)]
pub struct HttpGenerationGateway {
    endpoint: Endpoint,
}

impl HttpGenerationGateway {
    /// Create a gateway for the given base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self { endpoint: Endpoint::new(base_url, timeout)? })
    }

    /// Build from configuration. Returns `None` when no endpoint is configured.
    pub fn from_config(config: &ApiConfig) -> Result<Option<Self>, GatewayError> {
        let endpoint = Endpoint::from_config(&config.generation_url, config)?;
        Ok(endpoint.map(|endpoint| Self { endpoint }))
    }

    /// Send a bearer token with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.endpoint = self.endpoint.with_api_key(api_key);
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    async fn post<B: serde::Serialize + ?Sized, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        tracing::debug!(url = %self.endpoint.url(path), "Sending generation request");
        let response = self.endpoint.send(self.endpoint.post(path).json(body)).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl GenerationGateway for HttpGenerationGateway {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GatewayError> {
        let response: GenerateResponse = self.post("generate", request).await?;
        response.into_content()
    }

    async fn adapt(
        &self,
        request: &AdaptationRequest,
    ) -> Result<Vec<AdaptedVersion>, GatewayError> {
        let response: AdaptResponse = self.post("adapt", request).await?;
        Ok(response.into_versions())
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Generation endpoint response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GenerateResponse {
    fn into_content(self) -> Result<GeneratedContent, GatewayError> {
        match (self.success, self.content) {
            (true, Some(content)) => Ok(GeneratedContent { content }),
            (true, None) => Err(GatewayError::Unsuccessful("empty response".to_string())),
            (false, _) => Err(GatewayError::Unsuccessful(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }
}

/// Adaptation endpoint response: either wrapped or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AdaptResponse {
    Wrapped { versions: Vec<AdaptedVersion> },
    Bare(Vec<AdaptedVersion>),
}

impl AdaptResponse {
    fn into_versions(self) -> Vec<AdaptedVersion> {
        match self {
            Self::Wrapped { versions } | Self::Bare(versions) => versions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let gateway =
            HttpGenerationGateway::new("https://api.example.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(gateway.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_from_config_without_url_is_none() {
        let config = ApiConfig::default();
        assert!(HttpGenerationGateway::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_generate_response_success() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"success": true, "content": "Hello"}"#).unwrap();
        assert_eq!(response.into_content().unwrap().content, "Hello");
    }

    #[test]
    fn test_generate_response_failure_flag() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"success": false, "error": "quota"}"#).unwrap();
        let err = response.into_content().unwrap_err();
        assert!(err.to_string().contains("quota"));
    }

    #[test]
    fn test_adapt_response_shapes() {
        let wrapped: AdaptResponse =
            serde_json::from_str(r#"{"versions": [{"audience": "a", "content": "x"}]}"#).unwrap();
        let bare: AdaptResponse = serde_json::from_str(
            r#"[{"audience": "a", "content": "x"}, {"audience": "b", "content": "y"}]"#,
        )
        .unwrap();

        assert_eq!(wrapped.into_versions().len(), 1);
        assert_eq!(bare.into_versions().len(), 2);
    }
}
