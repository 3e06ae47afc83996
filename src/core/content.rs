//! Content item data model.
//!
//! A [`ContentItem`] is one unit of authored material: a press release, an
//! email, a social post. It owns its audience-adapted [`Version`]s and a small
//! block of derived metadata (word count, reading time, timestamps).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Words per minute used for the reading time estimate.
pub const READING_WORDS_PER_MINUTE: usize = 200;

/// Category of content the workspace can author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    PressRelease,
    SocialPost,
    Email,
    BlogPost,
    MediaPitch,
    ExecutiveStatement,
    TalkingPoints,
    QaDocument,
    Newsletter,
    ThoughtLeadership,
    CrisisResponse,
    Image,
    Video,
    Presentation,
}

impl ContentType {
    /// Every content type, in picker order.
    pub const ALL: [Self; 14] = [
        Self::PressRelease,
        Self::SocialPost,
        Self::Email,
        Self::BlogPost,
        Self::MediaPitch,
        Self::ExecutiveStatement,
        Self::TalkingPoints,
        Self::QaDocument,
        Self::Newsletter,
        Self::ThoughtLeadership,
        Self::CrisisResponse,
        Self::Image,
        Self::Video,
        Self::Presentation,
    ];

    /// Kebab-case identifier, as used on the wire.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::PressRelease => "press-release",
            Self::SocialPost => "social-post",
            Self::Email => "email",
            Self::BlogPost => "blog-post",
            Self::MediaPitch => "media-pitch",
            Self::ExecutiveStatement => "executive-statement",
            Self::TalkingPoints => "talking-points",
            Self::QaDocument => "qa-document",
            Self::Newsletter => "newsletter",
            Self::ThoughtLeadership => "thought-leadership",
            Self::CrisisResponse => "crisis-response",
            Self::Image => "image",
            Self::Video => "video",
            Self::Presentation => "presentation",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::PressRelease => "Press Release",
            Self::SocialPost => "Social Post",
            Self::Email => "Email",
            Self::BlogPost => "Blog Post",
            Self::MediaPitch => "Media Pitch",
            Self::ExecutiveStatement => "Executive Statement",
            Self::TalkingPoints => "Talking Points",
            Self::QaDocument => "Q&A Document",
            Self::Newsletter => "Newsletter",
            Self::ThoughtLeadership => "Thought Leadership",
            Self::CrisisResponse => "Crisis Response",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Presentation => "Presentation",
        }
    }

    /// Whether this type is produced by the visual pipeline rather than text generation.
    #[must_use]
    pub const fn is_visual(&self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::Presentation)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Error returned when parsing an unknown content type id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .find(|t| t.id() == needle)
            .copied()
            .ok_or_else(|| UnknownContentType(s.to_string()))
    }
}

/// Lifecycle status of a content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Draft,
}

impl ContentStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Draft => "draft",
        }
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority of a content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Derived and bookkeeping metadata for a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    /// When the item was created in this session
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
    /// Whitespace-delimited token count of the body
    pub word_count: usize,
    /// Estimated reading time in minutes
    pub reading_time: usize,
    /// When the item was last saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    /// Storage location reported by the library on save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ContentMetadata {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            word_count: 0,
            reading_time: 0,
            saved_at: None,
            location: None,
        }
    }
}

/// A content body adapted for one audience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    /// Audience profile identifier
    pub audience: String,
    pub body: String,
    /// Tone descriptor (e.g. "formal", "conversational")
    #[serde(default)]
    pub tone: String,
    /// Language descriptor (e.g. "plain", "technical", "en-US")
    #[serde(default)]
    pub language: String,
    pub created_at: DateTime<Utc>,
}

impl Version {
    /// Create a version for an audience.
    pub fn new(audience: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            audience: audience.into(),
            body: body.into(),
            tone: String::new(),
            language: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// One unit of authored material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Session-local identifier
    pub id: String,
    pub title: String,
    pub content_type: ContentType,
    pub status: ContentStatus,
    pub priority: Priority,
    pub body: String,
    #[serde(default)]
    pub versions: Vec<Version>,
    pub metadata: ContentMetadata,
}

impl ContentItem {
    /// Create an empty item of the given type.
    pub fn new(id: impl Into<String>, content_type: ContentType, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content_type,
            status: ContentStatus::Pending,
            priority: Priority::default(),
            body: String::new(),
            versions: Vec::new(),
            metadata: ContentMetadata::new(Utc::now()),
        }
    }

    /// Stamp `updated_at` and recompute word count and reading time.
    pub fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
        self.metadata.word_count = word_count(&self.body);
        self.metadata.reading_time = reading_time(self.metadata.word_count);
    }

    /// Whether the item has been saved at least once.
    pub fn is_saved(&self) -> bool {
        self.metadata.saved_at.is_some()
    }
}

/// Number of whitespace-delimited non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Reading time in whole minutes, rounded up.
pub fn reading_time(words: usize) -> usize {
    words.div_ceil(READING_WORDS_PER_MINUTE)
}
