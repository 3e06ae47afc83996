//! Remote content library.
//!
//! The library is the persisted collection of saved content items. This
//! module holds the wire types, the [`LibraryStore`] trait the workspace
//! talks to, an HTTP implementation, and the client-side reconciler that
//! classifies fetched rows and groups them into folders.

mod client;
mod folders;
mod reconcile;

pub use client::HttpLibraryClient;
pub use folders::{folder_of, FolderStructure, UNFILED};
pub use reconcile::{
    clamp_page_size, Library, LibrarySnapshot, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{ContentItem, Framework, WorkspaceContext};

/// Tag and status value marking a row as a template.
pub const TEMPLATE_MARKER: &str = "template";

/// Status value marking a row as a draft.
pub const DRAFT_STATUS: &str = "draft";

/// A stored item as returned by the library read endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content_type: String,
    /// Body: a plain string or structured JSON
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid row id: {other}"))),
    }
}

/// RFC 3339 timestamps, or naive ones read as UTC. Anything else is `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let Some(raw) = raw.as_str() else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    Ok(["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive)))
}

impl LibraryRow {
    /// Create a row with only the identifying fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content_type: String::new(),
            content: serde_json::Value::Null,
            metadata: serde_json::Value::Null,
            tags: Vec::new(),
            status: None,
            created_at: None,
            updated_at: None,
            created_by: None,
        }
    }

    /// Tagged `template` or status `template`.
    pub fn is_template(&self) -> bool {
        self.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(TEMPLATE_MARKER))
            || self.tags.iter().any(|t| t.eq_ignore_ascii_case(TEMPLATE_MARKER))
    }

    /// Status `draft`.
    pub fn is_draft(&self) -> bool {
        self.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(DRAFT_STATUS))
    }

    /// Timestamp used for ordering: `updated_at`, falling back to `created_at`.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }

    /// Body as plain text.
    ///
    /// Structured content is searched for a `text`, `body` or `content`
    /// field before falling back to its JSON rendering.
    pub fn body_text(&self) -> String {
        match &self.content {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => ["text", "body", "content"]
                .iter()
                .find_map(|key| other.get(key).and_then(|v| v.as_str()))
                .map_or_else(|| other.to_string(), ToString::to_string),
        }
    }
}

/// Payload pushed to the library save endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SavePayload {
    pub content_type: String,
    pub title: String,
    pub content: String,
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<Framework>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<String>,
    pub status: String,
    pub metadata: serde_json::Value,
}

impl SavePayload {
    /// Copy an item and its context into a save payload.
    pub fn from_item(item: &ContentItem, context: &WorkspaceContext) -> Self {
        Self {
            content_type: item.content_type.id().to_string(),
            title: item.title.clone(),
            content: item.body.clone(),
            organization_id: context.organization.id.clone(),
            framework: context.framework.clone(),
            opportunity: context.intelligence.as_ref().and_then(|i| i.opportunity.clone()),
            status: item.status.as_str().to_string(),
            metadata: serde_json::json!({
                "localId": item.id,
                "priority": item.priority,
                "wordCount": item.metadata.word_count,
                "readingTime": item.metadata.reading_time,
                "versions": item.versions,
                "createdAt": item.metadata.created_at,
                "updatedAt": item.metadata.updated_at,
            }),
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReceipt {
    /// Storage location reported by the backend
    pub location: Option<String>,
    /// Identifier assigned by the backend
    pub id: Option<String>,
}

/// Library errors.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Save rejected: {0}")]
    SaveRejected(String),
}

/// Result type for library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Trait for content library backends.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Persist a copy of an item.
    async fn save(&self, payload: &SavePayload) -> LibraryResult<SaveReceipt>;

    /// Fetch up to `limit` rows for an organization.
    async fn list(&self, organization_id: &str, limit: usize) -> LibraryResult<Vec<LibraryRow>>;
}
