//! Core types and functionality for draftdesk.
//!
//! This module contains the fundamental data structures used throughout
//! the application: content items, the workspace context, the editor store,
//! the pending-work queue, orchestration progress, and configuration.

pub mod config;
mod content;
mod context;
mod orchestration;
mod queue;
mod store;

pub use config::Config;
pub use content::{
    reading_time, word_count, ContentItem, ContentMetadata, ContentStatus, ContentType, Priority,
    UnknownContentType, Version, READING_WORDS_PER_MINUTE,
};
pub use context::{ContentNeed, Framework, Intelligence, Organization, WorkspaceContext};
pub use orchestration::{OrchestrationSession, Progress, TrackedNeed};
pub use queue::{Queue, QueueEntry, QueueError};
pub use store::{ContentStore, StoreError};
