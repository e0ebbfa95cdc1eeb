//! Service trait for record collections

use crate::core::record::Record;
use anyhow::Result;
use async_trait::async_trait;

/// Storage for one collection of records
///
/// Implementations own the single-writer discipline: `insert` and `clear` must
/// not interleave with another write to the same collection, and ids handed out
/// by `insert` are unique within the collection.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Initialize the backing storage (create directories, seed empty files)
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }

    /// List the whole collection in stored order
    async fn list(&self) -> Result<Vec<T>>;

    /// Stamp a draft with id and creation time and add it to the collection
    async fn insert(&self, draft: T::Draft) -> Result<T>;

    /// Remove every record, returning how many were removed
    async fn clear(&self) -> Result<usize>;
}
