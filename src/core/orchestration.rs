//! Orchestration session.
//!
//! Binds a framework's declared content needs to progress counters. The
//! session lives only as long as its owner; nothing is persisted.

use serde::Serialize;

use super::content::{ContentStatus, ContentType};
use super::context::{ContentNeed, Framework};
use super::queue::QueueError;

/// A content need and how far along it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedNeed {
    pub need: ContentNeed,
    pub status: ContentStatus,
    /// Content item produced for this need, once one exists
    pub item_id: Option<String>,
}

/// Progress counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

/// Ephemeral progress tracker for one framework.
#[derive(Debug, Clone)]
pub struct OrchestrationSession {
    framework_id: String,
    needs: Vec<TrackedNeed>,
}

impl OrchestrationSession {
    /// Track every content need declared by the framework.
    pub fn from_framework(framework: &Framework) -> Self {
        let needs = framework
            .content_needs
            .iter()
            .cloned()
            .map(|need| TrackedNeed { need, status: ContentStatus::Pending, item_id: None })
            .collect();

        Self { framework_id: framework.id.clone(), needs }
    }

    pub fn framework_id(&self) -> &str {
        &self.framework_id
    }

    pub fn needs(&self) -> &[TrackedNeed] {
        &self.needs
    }

    /// Index of the first pending need of the given type.
    pub fn next_pending(&self, content_type: ContentType) -> Option<usize> {
        self.needs
            .iter()
            .position(|n| n.need.content_type == content_type && n.status == ContentStatus::Pending)
    }

    /// Index of the need an item was started for.
    pub fn need_for_item(&self, item_id: &str) -> Option<usize> {
        self.needs.iter().position(|n| n.item_id.as_deref() == Some(item_id))
    }

    /// Mark a need as being worked on by an item.
    pub fn start(&mut self, index: usize, item_id: impl Into<String>) -> Result<(), QueueError> {
        let need = self.need_mut(index)?;
        if need.status != ContentStatus::Pending {
            return Err(QueueError::InvalidTransition {
                from: need.status,
                to: ContentStatus::InProgress,
            });
        }

        need.status = ContentStatus::InProgress;
        need.item_id = Some(item_id.into());
        Ok(())
    }

    /// Mark an in-progress need as done.
    pub fn complete(&mut self, index: usize) -> Result<(), QueueError> {
        let need = self.need_mut(index)?;
        if need.status != ContentStatus::InProgress {
            return Err(QueueError::InvalidTransition {
                from: need.status,
                to: ContentStatus::Completed,
            });
        }

        need.status = ContentStatus::Completed;
        Ok(())
    }

    pub fn progress(&self) -> Progress {
        let count =
            |status: ContentStatus| self.needs.iter().filter(|n| n.status == status).count();
        Progress {
            total: self.needs.len(),
            completed: count(ContentStatus::Completed),
            in_progress: count(ContentStatus::InProgress),
        }
    }

    /// Completed share in whole percent; an empty session is 100% done.
    pub fn percent_complete(&self) -> u8 {
        let progress = self.progress();
        if progress.total == 0 {
            return 100;
        }
        ((progress.completed * 100) / progress.total) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.needs.iter().all(|n| n.status == ContentStatus::Completed)
    }

    fn need_mut(&mut self, index: usize) -> Result<&mut TrackedNeed, QueueError> {
        self.needs.get_mut(index).ok_or_else(|| QueueError::NotFound(format!("need #{index}")))
    }
}
