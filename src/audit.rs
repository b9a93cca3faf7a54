//! Append-only CSV log of report exports

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

const HEADER: [&str; 5] = ["user", "file_name", "total_shirt", "total_films", "timestamp"];

/// One exported report, as recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub user: String,
    pub file_name: String,
    pub total_shirt: u32,
    pub total_films: u32,
    /// Rendered by the caller, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
}

/// Append-only export log behind a narrow `record` interface.
///
/// Appends are serialized by an internal lock; the header row is written
/// once, when the file is first created.
pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Append one entry, creating the file and its parent directory on
    /// first use.
    pub fn record(&self, entry: &AuditEntry) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let new_file = !self.path.exists();
        if new_file {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create log directory {}", parent.display())
                    })?;
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open log {}", self.path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if new_file {
            writer
                .write_record(HEADER)
                .context("Failed to write log header")?;
        }
        writer
            .serialize(entry)
            .context("Failed to append log entry")?;
        writer.flush().context("Failed to flush log")?;
        Ok(())
    }

    /// Read the full log, oldest first. A missing file is an empty log.
    pub fn entries(&self) -> Result<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open log {}", self.path.display()))?;
        let mut entries = Vec::new();
        for row in reader.deserialize() {
            entries.push(row.context("Malformed log entry")?);
        }
        Ok(entries)
    }
}
