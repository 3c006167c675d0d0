//! Database initialization, table definitions and the redb-backed store
//!
//! This module handles the setup of the embedded redb database and
//! implements [`MappingStore`] on top of it.

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::sync::Arc;

use crate::error::StoreError;
use crate::model::{NewShortLink, ShortCode, ShortLinkRecord};
use crate::store::{MappingStore, Result};

/// Main table for storing short link records
///
/// Key: short code as string
/// Value: JSON-serialized ShortLinkRecord as string
///
/// Example:
/// - Key: "aZ3k9Q"
/// - Value: '{"code":"aZ3k9Q","title":"Rust","original_url":"https://www.rust-lang.org/",...}'
pub const TABLE_LINKS: TableDefinition<&str, &str> = TableDefinition::new("short_links_v1");

/// Index table preserving creation order
///
/// Key: insertion sequence number, starting at 1
/// Value: JSON-serialized ShortLinkRecord as string
///
/// Scanning this table front to back yields records oldest first.
pub const TABLE_CREATION_ORDER: TableDefinition<u64, &str> =
    TableDefinition::new("creation_order_v1");

/// Initializes the embedded database and creates required tables
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "data.db")
///
/// # Example
///
/// ```no_run
/// # use shortlink::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_LINKS)?;
        write_txn.open_table(TABLE_CREATION_ORDER)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Durable [`MappingStore`] on an embedded redb file
///
/// redb admits a single write transaction at a time, so the existence check,
/// the main insert and the order-index append form one atomic step. Reads
/// run in read transactions and see a consistent snapshot.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Opens (or creates) the database file and wraps it
    pub fn open(db_path: &str) -> Result<Self> {
        init_db(db_path).map(Self::new)
    }
}

impl MappingStore for RedbStore {
    fn insert(&self, link: NewShortLink) -> Result<ShortLinkRecord> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table_main = write_txn.open_table(TABLE_LINKS)?;

            if table_main.get(link.code.as_str())?.is_some() {
                Err(link.code)
            } else {
                let record = link.stamp(Utc::now());
                let record_json = serde_json::to_string(&record)?;
                table_main.insert(record.code.as_str(), record_json.as_str())?;

                let mut table_order = write_txn.open_table(TABLE_CREATION_ORDER)?;
                let next_seq = match table_order.last()? {
                    Some((seq, _)) => seq.value() + 1,
                    None => 1,
                };
                table_order.insert(next_seq, record_json.as_str())?;

                Ok(record)
            }
        };

        match outcome {
            Ok(record) => {
                write_txn.commit()?;
                Ok(record)
            }
            Err(code) => {
                write_txn.abort()?;
                Err(StoreError::CodeCollision(code.to_string()))
            }
        }
    }

    fn get(&self, code: &ShortCode) -> Result<Option<ShortLinkRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_LINKS)?;

        let record = match table.get(code.as_str())? {
            Some(value) => Some(serde_json::from_str(value.value())?),
            None => None,
        };
        Ok(record)
    }

    fn contains(&self, code: &ShortCode) -> Result<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_LINKS)?;
        let found = table.get(code.as_str())?.is_some();
        Ok(found)
    }

    fn list_all(&self) -> Result<Vec<ShortLinkRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_CREATION_ORDER)?;

        let records = table
            .iter()?
            .map(|entry| -> Result<ShortLinkRecord> {
                let (_, value) = entry?;
                Ok(serde_json::from_str(value.value())?)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(records)
    }

    fn len(&self) -> Result<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_LINKS)?;
        Ok(table.len()? as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn temp_store() -> (RedbStore, NamedTempFile) {
        let temp_db = NamedTempFile::new().unwrap();
        let store = RedbStore::open(temp_db.path().to_str().unwrap()).unwrap();
        (store, temp_db)
    }

    fn link(code: &str, url: &str) -> NewShortLink {
        NewShortLink {
            code: ShortCode::parse(code).unwrap(),
            title: format!("title {code}"),
            original_url: url.to_string(),
        }
    }

    #[test]
    fn insert_and_get() {
        let (store, _temp_db) = temp_store();

        let inserted = store.insert(link("abc123", "https://example.com")).unwrap();
        let fetched = store
            .get(&ShortCode::parse("abc123").unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(inserted, fetched);
        assert!(store.contains(&inserted.code).unwrap());
    }

    #[test]
    fn collision_does_not_touch_order_index() {
        let (store, _temp_db) = temp_store();
        store.insert(link("abc123", "https://example.com")).unwrap();

        let err = store.insert(link("abc123", "https://other.com")).unwrap_err();
        assert!(matches!(err, StoreError::CodeCollision(_)));

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].original_url, "https://example.com");
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn list_all_follows_creation_order_not_key_order() {
        let (store, _temp_db) = temp_store();
        for code in ["zzz", "aaa", "mmm"] {
            store.insert(link(code, "https://example.com")).unwrap();
        }

        let codes: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.code.to_string())
            .collect();
        assert_eq!(codes, ["zzz", "aaa", "mmm"]);
    }

    #[test]
    fn records_survive_reopen() {
        let temp_db = NamedTempFile::new().unwrap();
        let path = temp_db.path().to_str().unwrap().to_string();

        {
            let store = RedbStore::open(&path).unwrap();
            store.insert(link("persist", "https://example.com/p")).unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        let record = store
            .get(&ShortCode::parse("persist").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(record.original_url, "https://example.com/p");
        assert!(!store.is_empty().unwrap());
    }
}
