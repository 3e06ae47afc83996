//! Folder grouping of library rows.
//!
//! Folders are a view, not an entity: the structure is rebuilt from the flat
//! row list every time the list changes. Each row lands in exactly one
//! named folder or in the single [`UNFILED`] bucket.

use std::collections::BTreeMap;

use super::LibraryRow;

/// Name of the bucket holding rows without a folder.
pub const UNFILED: &str = "Unfiled";

/// Tag prefix naming a folder, e.g. `folder:Launch`.
const FOLDER_TAG_PREFIX: &str = "folder:";

/// Folder derived from a row's metadata or tags.
///
/// `metadata.folder` wins over a `folder:` tag. Blank names and an explicit
/// "Unfiled" resolve to `None`.
pub fn folder_of(row: &LibraryRow) -> Option<String> {
    let from_metadata = row.metadata.get("folder").and_then(|f| f.as_str()).map(str::trim);

    let from_tags = || {
        row.tags
            .iter()
            .filter_map(|t| t.strip_prefix(FOLDER_TAG_PREFIX))
            .map(str::trim)
            .find(|name| !name.is_empty())
    };

    from_metadata
        .filter(|name| !name.is_empty())
        .or_else(from_tags)
        .filter(|name| !name.eq_ignore_ascii_case(UNFILED))
        .map(ToString::to_string)
}

/// Rows grouped by folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderStructure {
    folders: BTreeMap<String, Vec<LibraryRow>>,
    unfiled: Vec<LibraryRow>,
}

impl FolderStructure {
    /// Group rows from scratch.
    pub fn from_rows(rows: &[LibraryRow]) -> Self {
        let mut structure = Self::default();

        for row in rows {
            match folder_of(row) {
                Some(name) => structure.folders.entry(name).or_default().push(row.clone()),
                None => structure.unfiled.push(row.clone()),
            }
        }

        structure
    }

    /// Named folders in alphabetical order.
    pub fn folder_names(&self) -> Vec<&str> {
        self.folders.keys().map(String::as_str).collect()
    }

    /// Rows in a named folder.
    pub fn folder(&self, name: &str) -> Option<&[LibraryRow]> {
        if name == UNFILED {
            return Some(&self.unfiled);
        }
        self.folders.get(name).map(Vec::as_slice)
    }

    /// Rows without a folder.
    pub fn unfiled(&self) -> &[LibraryRow] {
        &self.unfiled
    }

    /// All buckets, named folders first and `Unfiled` last.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LibraryRow])> {
        self.folders
            .iter()
            .map(|(name, rows)| (name.as_str(), rows.as_slice()))
            .chain(std::iter::once((UNFILED, self.unfiled.as_slice())))
    }

    /// Total rows across all buckets.
    pub fn total_rows(&self) -> usize {
        self.folders.values().map(Vec::len).sum::<usize>() + self.unfiled.len()
    }
}
