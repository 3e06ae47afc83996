//! Client-side library reconciler.
//!
//! Holds the last successful fetch and the views derived from it. Every
//! refresh replaces the rows wholesale and recomputes the snapshot and the
//! folders; there is no incremental update, no pagination beyond a single
//! page, and no rollback of failed saves.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use super::{FolderStructure, LibraryResult, LibraryRow, LibraryStore};

/// Smallest allowed page size.
pub const MIN_PAGE_SIZE: usize = 100;

/// Largest allowed page size.
pub const MAX_PAGE_SIZE: usize = 500;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Clamp a requested page size into the supported range.
pub fn clamp_page_size(requested: usize) -> usize {
    requested.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// Fetched rows classified into recent items, templates and drafts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibrarySnapshot {
    /// Neither draft nor template
    pub recent: Vec<LibraryRow>,
    /// Tagged or status `template`
    pub templates: Vec<LibraryRow>,
    /// Status `draft`
    pub drafts: Vec<LibraryRow>,
}

impl LibrarySnapshot {
    /// Classify rows, newest first within each list.
    pub fn classify(rows: &[LibraryRow]) -> Self {
        let mut snapshot = Self::default();

        for row in rows {
            if row.is_template() {
                snapshot.templates.push(row.clone());
            } else if row.is_draft() {
                snapshot.drafts.push(row.clone());
            } else {
                snapshot.recent.push(row.clone());
            }
        }

        for list in [&mut snapshot.recent, &mut snapshot.templates, &mut snapshot.drafts] {
            sort_newest_first(list);
        }

        snapshot
    }

    /// Total rows across the three lists.
    pub fn len(&self) -> usize {
        self.recent.len() + self.templates.len() + self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sort_newest_first(rows: &mut [LibraryRow]) {
    rows.sort_by_key(|row| Reverse(row.timestamp()));
}

/// The library as seen by the workspace.
#[derive(Debug, Clone)]
pub struct Library {
    rows: Vec<LibraryRow>,
    snapshot: LibrarySnapshot,
    folders: FolderStructure,
    page_size: usize,
    last_refreshed: Option<DateTime<Utc>>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Library {
    /// Create an empty library view with the given page size.
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            snapshot: LibrarySnapshot::default(),
            folders: FolderStructure::default(),
            page_size: clamp_page_size(page_size),
            last_refreshed: None,
        }
    }

    /// Fetch one page for the organization and recompute every view.
    ///
    /// On failure the previous rows and views are left untouched.
    pub async fn refresh(
        &mut self,
        store: &dyn LibraryStore,
        organization_id: &str,
    ) -> LibraryResult<usize> {
        match store.list(organization_id, self.page_size).await {
            Ok(rows) => {
                tracing::debug!(count = rows.len(), organization_id, "Library refreshed");
                self.replace_rows(rows);
                self.last_refreshed = Some(Utc::now());
                Ok(self.rows.len())
            }
            Err(e) => {
                tracing::warn!(error = %e, organization_id, "Library refresh failed");
                Err(e)
            }
        }
    }

    /// Replace the row list and recompute the snapshot and folders.
    pub fn replace_rows(&mut self, mut rows: Vec<LibraryRow>) {
        // The store only honours the limit loosely.
        rows.truncate(self.page_size);

        self.snapshot = LibrarySnapshot::classify(&rows);
        self.folders = FolderStructure::from_rows(&rows);
        self.rows = rows;
    }

    /// Move a row into a folder locally and regroup.
    ///
    /// Returns `false` when no row has the given id.
    pub fn move_to_folder(&mut self, row_id: &str, folder: &str) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == row_id) else {
            return false;
        };

        if !row.metadata.is_object() {
            row.metadata = serde_json::json!({});
        }
        row.metadata["folder"] = serde_json::Value::String(folder.to_string());

        self.folders = FolderStructure::from_rows(&self.rows);
        self.snapshot = LibrarySnapshot::classify(&self.rows);
        true
    }

    /// Find a row by id.
    pub fn find(&self, row_id: &str) -> Option<&LibraryRow> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    pub fn rows(&self) -> &[LibraryRow] {
        &self.rows
    }

    pub fn snapshot(&self) -> &LibrarySnapshot {
        &self.snapshot
    }

    pub fn folders(&self) -> &FolderStructure {
        &self.folders
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{LibraryError, SavePayload, SaveReceipt};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct FakeStore {
        rows: Mutex<LibraryResult<Vec<LibraryRow>>>,
        requested_limit: Mutex<Option<usize>>,
    }

    impl FakeStore {
        fn with_rows(rows: Vec<LibraryRow>) -> Self {
            Self { rows: Mutex::new(Ok(rows)), requested_limit: Mutex::new(None) }
        }

        fn failing() -> Self {
            Self {
                rows: Mutex::new(Err(LibraryError::Api { status: 500, message: "down".into() })),
                requested_limit: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LibraryStore for FakeStore {
        async fn save(&self, _payload: &SavePayload) -> LibraryResult<SaveReceipt> {
            Err(LibraryError::SaveRejected("read only".to_string()))
        }

        async fn list(&self, _org: &str, limit: usize) -> LibraryResult<Vec<LibraryRow>> {
            *self.requested_limit.lock().unwrap() = Some(limit);
            match &*self.rows.lock().unwrap() {
                Ok(rows) => Ok(rows.clone()),
                Err(_) => Err(LibraryError::Api { status: 500, message: "down".into() }),
            }
        }
    }

    fn row(id: &str, status: Option<&str>, tags: &[&str], hour: u32) -> LibraryRow {
        let mut row = LibraryRow::new(id, id);
        row.status = status.map(ToString::to_string);
        row.tags = tags.iter().map(|t| (*t).to_string()).collect();
        row.updated_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap());
        row
    }

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(clamp_page_size(10), MIN_PAGE_SIZE);
        assert_eq!(clamp_page_size(250), 250);
        assert_eq!(clamp_page_size(10_000), MAX_PAGE_SIZE);
        assert_eq!(Library::new(0).page_size(), MIN_PAGE_SIZE);
    }

    #[test]
    fn test_classify_partitions_rows() {
        let rows = vec![
            row("published", Some("published"), &[], 1),
            row("draft", Some("draft"), &[], 2),
            row("tagged-template", None, &["template"], 3),
            row("status-template", Some("template"), &[], 4),
            row("draft-template", Some("draft"), &["template"], 5),
        ];

        let snapshot = LibrarySnapshot::classify(&rows);
        assert_eq!(snapshot.len(), rows.len());
        assert_eq!(snapshot.recent.len(), 1);
        assert_eq!(snapshot.drafts.len(), 1);
        assert_eq!(snapshot.templates.len(), 3);
    }

    #[test]
    fn test_classify_sorts_newest_first() {
        let mut undated = row("undated", None, &[], 0);
        undated.updated_at = None;
        let rows = vec![row("old", None, &[], 1), undated, row("new", None, &[], 9)];

        let snapshot = LibrarySnapshot::classify(&rows);
        let ids: Vec<&str> = snapshot.recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "undated"]);
    }

    #[tokio::test]
    async fn test_refresh_recomputes_views() {
        let store = FakeStore::with_rows(vec![
            row("1", Some("draft"), &["folder:Launch"], 1),
            row("2", None, &[], 2),
        ]);
        let mut library = Library::new(150);

        let count = library.refresh(&store, "org").await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(*store.requested_limit.lock().unwrap(), Some(150));
        assert_eq!(library.snapshot().drafts.len(), 1);
        assert_eq!(library.folders().folder("Launch").unwrap().len(), 1);
        assert!(library.last_refreshed().is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_state() {
        let mut library = Library::default();
        library.replace_rows(vec![row("1", None, &[], 1)]);

        let result = library.refresh(&FakeStore::failing(), "org").await;
        assert!(result.is_err());
        assert_eq!(library.rows().len(), 1);
        assert_eq!(library.snapshot().recent.len(), 1);
    }

    #[test]
    fn test_move_to_folder_regroups() {
        let mut library = Library::default();
        library.replace_rows(vec![row("1", None, &[], 1), row("2", None, &[], 2)]);
        assert_eq!(library.folders().unfiled().len(), 2);

        assert!(library.move_to_folder("1", "Board"));
        assert!(!library.move_to_folder("missing", "Board"));
        assert_eq!(library.folders().folder("Board").unwrap().len(), 1);
        assert_eq!(library.folders().unfiled().len(), 1);
        assert_eq!(library.find("1").unwrap().metadata["folder"], "Board");
    }
}
