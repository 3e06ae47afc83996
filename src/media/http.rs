//! HTTP visual generation gateway.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{JobState, JobStatus, MediaError, MediaGateway, VisualRequest, VisualResponse};
use crate::core::config::ApiConfig;
use crate::endpoint::{Endpoint, EndpointError};

impl From<EndpointError> for MediaError {
    fn from(err: EndpointError) -> Self {
        match err {
            EndpointError::Http(e) => Self::Http(e),
            EndpointError::Status { status, message } => Self::Api { status, message },
        }
    }
}

/// Visual generation gateway backed by a remote HTTP service.
#[derive(Debug, Clone)]
pub struct HttpMediaGateway {
    endpoint: Endpoint,
}

impl HttpMediaGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MediaError> {
        Ok(Self { endpoint: Endpoint::new(base_url, timeout)? })
    }

    /// Build from configuration. Returns `None` when no endpoint is configured.
    pub fn from_config(config: &ApiConfig) -> Result<Option<Self>, MediaError> {
        let endpoint = Endpoint::from_config(&config.media_url, config)?;
        Ok(endpoint.map(|endpoint| Self { endpoint }))
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.endpoint = self.endpoint.with_api_key(api_key);
        self
    }
}

#[async_trait]
impl MediaGateway for HttpMediaGateway {
    async fn generate(&self, request: &VisualRequest) -> Result<VisualResponse, MediaError> {
        let path = "visual/generate";
        tracing::debug!(
            url = %self.endpoint.url(path),
            kind = ?request.kind,
            "Requesting visual generation"
        );

        let response = self.endpoint.send(self.endpoint.post(path).json(request)).await?;
        let response: GenerateResponse = response.json().await?;
        response.into_visual()
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus, MediaError> {
        let path = format!("visual/status/{job_id}");
        let response = self.endpoint.send(self.endpoint.get(&path)).await?;
        let response: StatusResponse = response.json().await?;
        Ok(response.into_status())
    }
}

/// Generation endpoint response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default, alias = "jobId")]
    job_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

impl GenerateResponse {
    fn into_visual(self) -> Result<VisualResponse, MediaError> {
        if !self.success {
            return Err(MediaError::Unsuccessful(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        if !self.images.is_empty() {
            return Ok(VisualResponse::Images(self.images));
        }

        self.job_id.map(VisualResponse::Job).ok_or(MediaError::MissingJob)
    }
}

/// Status endpoint response.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default, alias = "videoUrl", alias = "video_url")]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl StatusResponse {
    fn into_status(self) -> JobStatus {
        JobStatus { state: JobState::normalize(&self.status), url: self.url, error: self.error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_response_with_images() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"images": ["https://cdn/1.png"]}"#).unwrap();
        assert_eq!(
            response.into_visual().unwrap(),
            VisualResponse::Images(vec!["https://cdn/1.png".to_string()])
        );
    }

    #[test]
    fn test_generate_response_with_job() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"success": true, "jobId": "job-7"}"#).unwrap();
        assert_eq!(response.into_visual().unwrap(), VisualResponse::Job("job-7".to_string()));
    }

    #[test]
    fn test_generate_response_without_result() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(response.into_visual(), Err(MediaError::MissingJob)));

        let failed: GenerateResponse =
            serde_json::from_str(r#"{"success": false, "error": "nsfw"}"#).unwrap();
        assert!(matches!(failed.into_visual(), Err(MediaError::Unsuccessful(m)) if m == "nsfw"));
    }

    #[test]
    fn test_status_response() {
        let response: StatusResponse =
            serde_json::from_str(r#"{"status": "completed", "videoUrl": "https://cdn/v.mp4"}"#)
                .unwrap();
        let status = response.into_status();
        assert_eq!(status.state, JobState::Completed);
        assert_eq!(status.url.as_deref(), Some("https://cdn/v.mp4"));
    }

    #[test]
    fn test_from_config_without_url_is_none() {
        assert!(HttpMediaGateway::from_config(&ApiConfig::default()).unwrap().is_none());
    }
}
