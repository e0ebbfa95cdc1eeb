//! In-memory implementation of RecordStore for testing and development

use super::IdSequence;
use crate::core::{Record, RecordStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, RwLock};

struct Collection<T> {
    records: Vec<T>,
    ids: IdSequence,
}

/// In-memory record store
///
/// Same contract as the file store, nothing survives the process. Uses RwLock
/// for thread-safe access; the write lock is the single writer.
#[derive(Clone)]
pub struct InMemoryStore<T> {
    inner: Arc<RwLock<Collection<T>>>,
}

impl<T: Record> InMemoryStore<T> {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a store pre-filled with records, kept in the given order
    pub fn with_records(records: Vec<T>) -> Self {
        let mut ids = IdSequence::new();
        ids.observe(records.iter().map(|r| r.id()).max().unwrap_or(0));
        Self {
            inner: Arc::new(RwLock::new(Collection { records, ids })),
        }
    }
}

impl<T: Record> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for InMemoryStore<T> {
    async fn list(&self) -> Result<Vec<T>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(inner.records.clone())
    }

    async fn insert(&self, draft: T::Draft) -> Result<T> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let now = Utc::now();
        let id = inner.ids.next(now)?;
        let record = T::stamp(draft, id, now);
        T::KIND.placement().place(&mut inner.records, record.clone());

        Ok(record)
    }

    async fn clear(&self) -> Result<usize> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let removed = inner.records.len();
        inner.records.clear();

        Ok(removed)
    }
}
