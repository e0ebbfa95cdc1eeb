//! Storage implementations for record collections

pub mod in_memory;
pub mod json_file;

pub use in_memory::InMemoryStore;
pub use json_file::JsonFileStore;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

/// Monotonic id source for one collection
///
/// Ids follow wall-clock milliseconds but never repeat or go backwards: each id
/// is at least one greater than the last one handed out and than any id already
/// present in the collection.
#[derive(Debug, Default, Clone)]
pub struct IdSequence {
    last: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the floor to the highest id already stored
    pub fn observe(&mut self, existing_max: u64) {
        self.last = self.last.max(existing_max);
    }

    /// Hand out the next id
    ///
    /// Fails once the sequence reaches `u64::MAX`; an id is never reused.
    pub fn next(&mut self, now: DateTime<Utc>) -> Result<u64> {
        let floor = self
            .last
            .checked_add(1)
            .ok_or_else(|| anyhow!("id sequence exhausted at {}", self.last))?;
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(floor);
        self.last = id;
        Ok(id)
    }
}
