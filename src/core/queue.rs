//! Pending-work queue.
//!
//! A transient list of content items awaiting or undergoing generation and
//! review. Status moves pending -> in-progress -> completed only through
//! explicit user actions; nothing on the backend drives it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::{ContentItem, ContentStatus, ContentType};

/// A content item surfaced in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    /// Id of the referenced content item
    pub item_id: String,
    pub title: String,
    pub content_type: ContentType,
    pub status: ContentStatus,
    pub enqueued_at: DateTime<Utc>,
}

impl QueueEntry {
    /// Create a pending entry referencing an item.
    pub fn for_item(item: &ContentItem) -> Self {
        Self {
            item_id: item.id.clone(),
            title: item.title.clone(),
            content_type: item.content_type,
            status: ContentStatus::Pending,
            enqueued_at: Utc::now(),
        }
    }
}

/// Queue errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Queue entry not found: {0}")]
    NotFound(String),

    #[error("Cannot move queue entry from {from} to {to}")]
    InvalidTransition { from: ContentStatus, to: ContentStatus },
}

/// Ordered list of queue entries, at most one per item id.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    entries: Vec<QueueEntry>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item if it is not queued yet.
    ///
    /// Returns `true` when a new entry was added.
    pub fn enqueue(&mut self, item: &ContentItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }

        tracing::debug!(item_id = %item.id, "Queued content item");
        self.entries.push(QueueEntry::for_item(item));
        true
    }

    /// React to a save: drafts are queued exactly once, other items never.
    pub fn record_save(&mut self, item: &ContentItem) -> bool {
        if item.status != ContentStatus::Draft {
            return false;
        }
        self.enqueue(item)
    }

    /// Move an entry from pending to in-progress.
    pub fn start(&mut self, item_id: &str) -> Result<&QueueEntry, QueueError> {
        self.transition(item_id, ContentStatus::Pending, ContentStatus::InProgress)
    }

    /// Move an entry from in-progress to completed.
    pub fn complete(&mut self, item_id: &str) -> Result<&QueueEntry, QueueError> {
        self.transition(item_id, ContentStatus::InProgress, ContentStatus::Completed)
    }

    fn transition(
        &mut self,
        item_id: &str,
        from: ContentStatus,
        to: ContentStatus,
    ) -> Result<&QueueEntry, QueueError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.item_id == item_id)
            .ok_or_else(|| QueueError::NotFound(item_id.to_string()))?;

        if entry.status != from {
            return Err(QueueError::InvalidTransition { from: entry.status, to });
        }

        entry.status = to;
        Ok(entry)
    }

    /// Remove an entry. Returns `true` if it existed.
    pub fn remove(&mut self, item_id: &str) -> bool {
        let len_before = self.entries.len();
        self.entries.retain(|e| e.item_id != item_id);
        self.entries.len() < len_before
    }

    /// Whether an item is queued.
    pub fn contains(&self, item_id: &str) -> bool {
        self.entries.iter().any(|e| e.item_id == item_id)
    }

    pub fn get(&self, item_id: &str) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.item_id == item_id)
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Entries that have not started yet.
    pub fn pending(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter().filter(|e| e.status == ContentStatus::Pending)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
