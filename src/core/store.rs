//! Content item store.
//!
//! Holds the single item currently open in the editor. Every mutation stamps
//! `updated_at` and recomputes word count and reading time. Titles and types
//! are not validated; empty strings are accepted.

use std::time::Duration;

use chrono::Utc;

use super::content::{ContentItem, ContentStatus, ContentType, Priority, Version};
use super::context::{Framework, WorkspaceContext};
use crate::gateway::{GatewayError, GeneratedContent, GENERATION_FAILED_PLACEHOLDER};
use crate::library::{LibraryError, LibraryStore, SavePayload, SaveReceipt};

/// Store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No content item is open")]
    NoCurrentItem,

    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// Editor state: exactly one current item at a time.
#[derive(Debug, Default)]
pub struct ContentStore {
    current: Option<ContentItem>,
    /// Disambiguates ids minted within the same millisecond.
    next_seq: u64,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh item of the given type, replacing the current one.
    pub fn select_type(
        &mut self,
        content_type: ContentType,
        framework: Option<&Framework>,
    ) -> &ContentItem {
        let title = match framework {
            Some(framework) => format!("{}: {}", content_type.display_name(), framework.title),
            None => format!("New {}", content_type.display_name()),
        };

        let mut item = ContentItem::new(self.next_id(), content_type, title);
        item.status = ContentStatus::InProgress;
        item.touch();

        tracing::debug!(item_id = %item.id, %content_type, "Selected content type");
        self.current.insert(item)
    }

    /// Open an existing item, e.g. one reloaded from the library.
    pub fn open(&mut self, item: ContentItem) -> &ContentItem {
        self.current.insert(item)
    }

    /// Close the current item.
    pub fn close(&mut self) -> Option<ContentItem> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&ContentItem> {
        self.current.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<&ContentItem, StoreError> {
        let title = title.into();
        self.mutate(|item| item.title = title)
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> Result<&ContentItem, StoreError> {
        let body = body.into();
        self.mutate(|item| item.body = body)
    }

    pub fn set_status(&mut self, status: ContentStatus) -> Result<&ContentItem, StoreError> {
        self.mutate(|item| item.status = status)
    }

    pub fn set_priority(&mut self, priority: Priority) -> Result<&ContentItem, StoreError> {
        self.mutate(|item| item.priority = priority)
    }

    pub fn add_version(&mut self, version: Version) -> Result<&ContentItem, StoreError> {
        self.mutate(|item| item.versions.push(version))
    }

    /// Record a successful save.
    ///
    /// Drafts stay drafts; anything else becomes `completed`.
    pub fn mark_saved(&mut self, location: Option<String>) -> Result<&ContentItem, StoreError> {
        self.mutate(|item| {
            item.metadata.saved_at = Some(Utc::now());
            item.metadata.location = location;
            if item.status != ContentStatus::Draft {
                item.status = ContentStatus::Completed;
            }
        })
    }

    /// Fold a generation result into the body.
    ///
    /// Success replaces the body with the generated text; failure replaces it
    /// with [`GENERATION_FAILED_PLACEHOLDER`]. Returns whether generation
    /// succeeded.
    pub fn apply_generation(
        &mut self,
        result: Result<GeneratedContent, GatewayError>,
    ) -> Result<bool, StoreError> {
        let (body, generated) = match result {
            Ok(generated) => (generated.content, true),
            Err(e) => {
                tracing::warn!(error = %e, "Content generation failed");
                (GENERATION_FAILED_PLACEHOLDER.to_string(), false)
            }
        };

        self.set_body(body)?;
        Ok(generated)
    }

    /// Fold an adaptation result into the version list.
    ///
    /// Appends every version on success and none on failure. Returns the
    /// number appended.
    pub fn apply_adaptation(
        &mut self,
        result: Result<Vec<Version>, GatewayError>,
    ) -> Result<usize, StoreError> {
        if self.current.is_none() {
            return Err(StoreError::NoCurrentItem);
        }

        match result {
            Ok(versions) => {
                let count = versions.len();
                self.mutate(|item| item.versions.extend(versions))?;
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Audience adaptation failed");
                Ok(0)
            }
        }
    }

    /// Save the current item.
    ///
    /// Without a library the save is simulated by waiting `simulated_delay`.
    /// Failures are logged and returned; nothing is retried.
    pub async fn save(
        &mut self,
        library: Option<&dyn LibraryStore>,
        context: &WorkspaceContext,
        simulated_delay: Duration,
    ) -> Result<SaveReceipt, StoreError> {
        let item = self.current.as_ref().ok_or(StoreError::NoCurrentItem)?;

        let receipt = match library {
            Some(library) => {
                let payload = SavePayload::from_item(item, context);
                library.save(&payload).await.inspect_err(|e| {
                    tracing::warn!(error = %e, item_id = %item.id, "Save failed");
                })?
            }
            None => {
                tracing::debug!(item_id = %item.id, "No library configured, simulating save");
                tokio::time::sleep(simulated_delay).await;
                SaveReceipt::default()
            }
        };

        self.mark_saved(receipt.location.clone())?;
        Ok(receipt)
    }

    fn mutate(&mut self, f: impl FnOnce(&mut ContentItem)) -> Result<&ContentItem, StoreError> {
        let item = self.current.as_mut().ok_or(StoreError::NoCurrentItem)?;
        f(item);
        item.touch();
        Ok(item)
    }

    fn next_id(&mut self) -> String {
        self.next_seq += 1;
        format!("content-{}-{}", Utc::now().timestamp_millis(), self.next_seq)
    }
}
