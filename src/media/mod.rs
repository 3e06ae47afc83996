//! Visual content generation.
//!
//! Image requests usually come back immediately with URLs; video requests
//! come back with a job id whose status is polled until it settles. See
//! [`MediaPoller`] for the polling task.

mod http;
mod poller;

pub use http::HttpMediaGateway;
pub use poller::{MediaPoller, PollConfig, PollHandle, PollOutcome};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{ContentType, Framework};

/// Kind of visual asset to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualKind {
    Image,
    Video,
    Presentation,
}

impl VisualKind {
    /// Visual kind for a content type, if it is a visual one.
    pub const fn for_content_type(content_type: ContentType) -> Option<Self> {
        match content_type {
            ContentType::Image => Some(Self::Image),
            ContentType::Video => Some(Self::Video),
            ContentType::Presentation => Some(Self::Presentation),
            _ => None,
        }
    }
}

impl std::str::FromStr for VisualKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "presentation" => Ok(Self::Presentation),
            other => Err(format!("Unknown visual kind: {other}")),
        }
    }
}

/// A visual generation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualRequest {
    #[serde(rename = "type")]
    pub kind: VisualKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<Framework>,
    pub style: String,
    pub aspect_ratio: String,
    /// Video length in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub prompt: String,
}

impl VisualRequest {
    pub fn new(kind: VisualKind) -> Self {
        Self {
            kind,
            framework: None,
            style: "professional".to_string(),
            aspect_ratio: "16:9".to_string(),
            duration: matches!(kind, VisualKind::Video).then_some(30),
            prompt: String::new(),
        }
    }
}

/// What the generation endpoint handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualResponse {
    /// Finished images, ready to use
    Images(Vec<String>),
    /// Asynchronous job to poll
    Job(String),
}

/// State of an asynchronous media job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    /// Whether polling should stop.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Map a backend status string onto a job state.
    ///
    /// Unknown strings are treated as still processing.
    pub fn normalize(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        if normalized.contains("complete")
            || normalized.contains("succe")
            || normalized == "done"
            || normalized == "ready"
        {
            return Self::Completed;
        }
        if normalized.contains("fail")
            || normalized.contains("error")
            || normalized.contains("cancel")
        {
            return Self::Failed;
        }
        if normalized.contains("pending")
            || normalized.contains("queue")
            || normalized == "submitted"
        {
            return Self::Pending;
        }
        Self::Processing
    }
}

/// Status of a media job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub state: JobState,
    /// Result URL once completed
    pub url: Option<String>,
    /// Failure reason
    pub error: Option<String>,
}

impl JobStatus {
    pub fn new(state: JobState) -> Self {
        Self { state, url: None, error: None }
    }
}

/// Media errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Visual generation unsuccessful: {0}")]
    Unsuccessful(String),

    #[error("Response carried neither images nor a job id")]
    MissingJob,
}

/// Trait for visual generation backends.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Start a generation.
    async fn generate(&self, request: &VisualRequest) -> Result<VisualResponse, MediaError>;

    /// Look up an asynchronous job.
    async fn job_status(&self, job_id: &str) -> Result<JobStatus, MediaError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_job_state() {
        assert_eq!(JobState::normalize("COMPLETED"), JobState::Completed);
        assert_eq!(JobState::normalize("succeeded"), JobState::Completed);
        assert_eq!(JobState::normalize("failed"), JobState::Failed);
        assert_eq!(JobState::normalize("cancelled"), JobState::Failed);
        assert_eq!(JobState::normalize("queued"), JobState::Pending);
        assert_eq!(JobState::normalize("rendering"), JobState::Processing);
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Processing.is_terminal());
    }

    #[test]
    fn test_visual_request_defaults() {
        let video = VisualRequest::new(VisualKind::Video);
        let image = VisualRequest::new(VisualKind::Image);
        assert_eq!(video.duration, Some(30));
        assert_eq!(image.duration, None);

        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["aspectRatio"], "16:9");
        assert!(json.get("prompt").is_none());
    }

    #[test]
    fn test_visual_kind_for_content_type() {
        assert_eq!(VisualKind::for_content_type(ContentType::Video), Some(VisualKind::Video));
        assert_eq!(VisualKind::for_content_type(ContentType::Email), None);
        assert_eq!("Presentation".parse::<VisualKind>().unwrap(), VisualKind::Presentation);
    }
}
