//! JSON file storage backend
//!
//! Each collection lives in one JSON document holding an array of records.
//!
//! # Reads
//!
//! Reads are fail-open: a missing, empty, unreadable or unparseable file reads
//! as an empty collection so a damaged file never fails a request. Entries of
//! an otherwise valid array are decoded one by one; an entry that does not fit
//! the record type is left out of listings but kept on disk.
//!
//! # Writes
//!
//! `insert` and `clear` hold the collection's writer lock across the whole
//! read-modify-write, so concurrent requests cannot drop each other's records.
//! `insert` works on the raw entries, so records it cannot decode survive the
//! rewrite. The new document is written to a sibling temp file and renamed
//! over the old one; lock-free readers see either the previous or the next
//! collection.

use super::IdSequence;
use crate::core::{Record, RecordStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A collection stored as a pretty-printed JSON array in a single file
pub struct JsonFileStore<T> {
    path: PathBuf,
    writer: Mutex<IdSequence>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> JsonFileStore<T> {
    /// Store backed by an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(IdSequence::new()),
            _marker: PhantomData,
        }
    }

    /// Store backed by the kind's default file name inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(T::KIND.file_name()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw array entries, or nothing when the file is missing or not an array
    async fn read_entries(&self) -> Vec<Value> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "collection file missing, reading as empty");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "collection file unreadable, reading as empty");
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str(&content) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!(
                    path = %self.path.display(),
                    kind = T::KIND.plural(),
                    "collection file is not an array, reading as empty"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    kind = T::KIND.plural(),
                    error = %e,
                    "collection file is corrupt, reading as empty"
                );
                Vec::new()
            }
        }
    }

    /// Decode entries, skipping the ones that do not fit `T`
    fn decode(&self, entries: &[Value]) -> Vec<T> {
        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match T::deserialize(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        kind = T::KIND.plural(),
                        index,
                        error = %e,
                        "skipping unreadable record"
                    );
                    None
                }
            })
            .collect()
    }

    async fn read_all(&self) -> Vec<T> {
        let entries = self.read_entries().await;
        self.decode(&entries)
    }

    async fn write_all<S: Serialize>(&self, entries: &[S]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }

        let mut json = serde_json::to_vec_pretty(entries)
            .with_context(|| format!("serializing {}", T::KIND.plural()))?;
        json.push(b'\n');

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Id of a raw entry, whether or not the rest of it decodes
fn entry_id(entry: &Value) -> Option<u64> {
    entry.get("id").and_then(Value::as_u64)
}

#[async_trait]
impl<T: Record> RecordStore<T> for JsonFileStore<T> {
    async fn prepare(&self) -> Result<()> {
        let _writer = self.writer.lock().await;
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }
        self.write_all::<Value>(&[]).await?;
        tracing::info!(path = %self.path.display(), "initialized empty collection file");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<T>> {
        Ok(self.read_all().await)
    }

    async fn insert(&self, draft: T::Draft) -> Result<T> {
        let mut ids = self.writer.lock().await;

        let mut entries = self.read_entries().await;
        ids.observe(entries.iter().filter_map(entry_id).max().unwrap_or(0));

        let now = Utc::now();
        let record = T::stamp(draft, ids.next(now)?, now);
        let entry = serde_json::to_value(&record)
            .with_context(|| format!("serializing {}", T::KIND.singular()))?;
        T::KIND.placement().place(&mut entries, entry);

        self.write_all(&entries).await?;
        Ok(record)
    }

    async fn clear(&self) -> Result<usize> {
        let _writer = self.writer.lock().await;
        let removed = self.read_entries().await.len();
        self.write_all::<Value>(&[]).await?;
        Ok(removed)
    }
}
