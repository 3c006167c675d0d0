//! Mapping store abstraction and the in-memory backend
//!
//! The service only talks to [`MappingStore`], so the same creation and
//! lookup logic runs against the in-memory table or the embedded redb file
//! in [`crate::database`].

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::model::{NewShortLink, ShortCode, ShortLinkRecord};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable `code -> record` table with unique codes and ordered enumeration
pub trait MappingStore: Send + Sync + 'static {
    /// Atomically checks and inserts. Returns `Err(CodeCollision)` if the code
    /// is already present; the store is left untouched in that case.
    fn insert(&self, link: NewShortLink) -> Result<ShortLinkRecord>;

    /// Retrieves the record for a code, `None` if unknown.
    fn get(&self, code: &ShortCode) -> Result<Option<ShortLinkRecord>>;

    /// Checks whether a code is already taken.
    fn contains(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.get(code)?.is_some())
    }

    /// Snapshot of every record, oldest first.
    fn list_all(&self) -> Result<Vec<ShortLinkRecord>>;

    /// Number of stored records.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[derive(Debug, Default)]
struct Table {
    by_code: HashMap<ShortCode, usize>,
    records: Vec<ShortLinkRecord>,
}

/// In-memory store backed by a `parking_lot::RwLock`
///
/// Records live in an append-only `Vec` (insertion order) with a code index
/// pointing into it. A record is only pushed once fully built, under the
/// write lock, so readers never see a partial entry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MappingStore for MemoryStore {
    fn insert(&self, link: NewShortLink) -> Result<ShortLinkRecord> {
        let mut table = self.table.write();
        if table.by_code.contains_key(&link.code) {
            return Err(StoreError::CodeCollision(link.code.to_string()));
        }

        let record = link.stamp(Utc::now());
        let index = table.records.len();
        table.by_code.insert(record.code.clone(), index);
        table.records.push(record.clone());
        Ok(record)
    }

    fn get(&self, code: &ShortCode) -> Result<Option<ShortLinkRecord>> {
        let table = self.table.read();
        Ok(table
            .by_code
            .get(code)
            .map(|&index| table.records[index].clone()))
    }

    fn contains(&self, code: &ShortCode) -> Result<bool> {
        let table = self.table.read();
        Ok(table.by_code.contains_key(code))
    }

    fn list_all(&self) -> Result<Vec<ShortLinkRecord>> {
        let table = self.table.read();
        Ok(table.records.clone())
    }

    fn len(&self) -> Result<usize> {
        let table = self.table.read();
        Ok(table.records.len())
    }
}
