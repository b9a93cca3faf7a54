//! Per-user JSON persistence under the shared data directory

use crate::record::{parse_items, ItemRecord};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// One JSON document per user, stored as `<data_dir>/<user>.json`.
///
/// There is no cross-process locking: a save overwrites whatever was
/// there, last writer wins.
pub struct NoteStore {
    dir: PathBuf,
}

/// What [`NoteStore::save`] did with the submitted text.
#[derive(Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The text parsed as a record list and was written out.
    Saved { records: usize },
    /// Empty submission: the document now holds `[]`.
    Cleared,
}

/// Classification used by the status overview.
#[derive(Debug, PartialEq, Eq)]
pub enum UserStatus {
    /// No document for this user yet.
    Missing,
    /// The document cannot be read or parsed at all.
    Unreadable,
    /// The document parsed but holds no records to export.
    Empty,
    /// The document holds `records` exportable records.
    Ready { records: usize },
}

impl NoteStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn document_path(&self, user: &str) -> PathBuf {
        self.dir.join(format!("{user}.json"))
    }

    /// Validate and persist `text` for `user`, overwriting any previous
    /// document. Whitespace-only text clears the document to `[]` so a
    /// deliberate deletion is distinguishable from a missing file.
    /// Invalid text leaves the previous document untouched.
    pub fn save(&self, user: &str, text: &str) -> Result<SaveOutcome> {
        let path = self.document_path(user);
        let text = text.trim();
        if text.is_empty() {
            fs::write(&path, "[]")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            return Ok(SaveOutcome::Cleared);
        }

        let items = parse_items(text)?;
        let pretty = serde_json::to_string_pretty(&items)
            .context("Failed to serialize records")?;
        fs::write(&path, pretty)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(SaveOutcome::Saved {
            records: items.len(),
        })
    }

    /// Load a user's records. A missing document is an empty list, not an
    /// error.
    pub fn load(&self, user: &str) -> Result<Vec<ItemRecord>> {
        let path = self.document_path(user);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let items = parse_items(&content)
            .with_context(|| format!("Invalid order data in {}", path.display()))?;
        Ok(items)
    }

    /// Classify a user's document for the status overview.
    pub fn status(&self, user: &str) -> UserStatus {
        let path = self.document_path(user);
        if !path.exists() {
            return UserStatus::Missing;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            return UserStatus::Unreadable;
        };
        let Ok(value) = serde_json::from_str::<Value>(&content) else {
            return UserStatus::Unreadable;
        };
        match value {
            Value::Array(elements) if !elements.is_empty() => UserStatus::Ready {
                records: elements.len(),
            },
            _ => UserStatus::Empty,
        }
    }

    /// Users that currently have a document, sorted by name.
    pub fn known_users(&self) -> Result<Vec<String>> {
        let mut users = Vec::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read data directory {}", self.dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    users.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        users.sort();
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, NoteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes")).unwrap();
        (dir, store)
    }

    #[test]
    fn save_and_load_round_trip() {
        let (_dir, store) = store();
        let outcome = store
            .save("tien", r#"[{"order_external_id": "O1", "index_item": "1"}]"#)
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { records: 1 });

        let items = store.load("tien").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].field("order_external_id"), "O1");
    }

    #[test]
    fn empty_text_clears_the_document() {
        let (_dir, store) = store();
        store.save("hai", r#"[{"index_item": "1"}]"#).unwrap();
        assert_eq!(store.save("hai", "   \n").unwrap(), SaveOutcome::Cleared);
        assert!(store.load("hai").unwrap().is_empty());
        assert_eq!(store.status("hai"), UserStatus::Empty);
    }

    #[test]
    fn invalid_json_leaves_previous_document_untouched() {
        let (_dir, store) = store();
        store.save("dung", r#"[{"index_item": "1"}]"#).unwrap();
        assert!(store.save("dung", "{broken").is_err());
        assert_eq!(store.load("dung").unwrap().len(), 1);
    }

    #[test]
    fn non_list_document_is_rejected() {
        let (_dir, store) = store();
        assert!(store.save("son", r#"{"index_item": "1"}"#).is_err());
        assert_eq!(store.status("son"), UserStatus::Missing);
    }

    #[test]
    fn missing_document_loads_as_empty_list() {
        let (_dir, store) = store();
        assert!(store.load("nobody").unwrap().is_empty());
        assert_eq!(store.status("nobody"), UserStatus::Missing);
    }

    #[test]
    fn status_classifies_ready_documents() {
        let (_dir, store) = store();
        store
            .save("tien", r#"[{"index_item": "1"}, {"index_item": "2"}]"#)
            .unwrap();
        assert_eq!(store.status("tien"), UserStatus::Ready { records: 2 });
    }

    #[test]
    fn status_flags_corrupt_documents_unreadable() {
        let (_dir, store) = store();
        store.save("tien", "[]").unwrap();
        fs::write(store.document_path("tien"), "not json {{{").unwrap();
        assert_eq!(store.status("tien"), UserStatus::Unreadable);
    }

    #[test]
    fn known_users_lists_json_documents_sorted() {
        let (_dir, store) = store();
        store.save("son", "[]").unwrap();
        store.save("dung", "[]").unwrap();
        assert_eq!(store.known_users().unwrap(), vec!["dung", "son"]);
    }
}
