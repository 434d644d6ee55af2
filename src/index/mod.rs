//! Index layer consumed by the executors.
//!
//! [`HashIndex`] adapts the disk extendible hash table to the narrow
//! interface the execution engine needs: probe a key tuple, insert an
//! entry, delete an entry.

use std::sync::Arc;

use crate::buffer::BufferPoolManager;
use crate::common::{Error, Result, Rid};
use crate::container::{DefaultKeyHasher, DiskExtendibleHashTable};
use crate::execution::Transaction;
use crate::storage::page::{HashBucketPage, HASH_DIRECTORY_MAX_DEPTH};
use crate::types::{Tuple, Value};

/// Equality index over a single integer key column.
///
/// Keys are unique; the key tuple is the projection of a row through the
/// index's key attributes.
pub struct HashIndex {
    table: DiskExtendibleHashTable<i64, Rid, DefaultKeyHasher>,
}

impl HashIndex {
    pub fn new(bpm: Arc<BufferPoolManager>) -> Result<Self> {
        let bucket_max_size = HashBucketPage::<i64, Rid>::capacity();
        let table = DiskExtendibleHashTable::new(
            bpm,
            DefaultKeyHasher,
            0,
            HASH_DIRECTORY_MAX_DEPTH,
            bucket_max_size,
        )?;
        Ok(Self { table })
    }

    fn key_value(key: &Tuple) -> Result<i64> {
        match key.value(0) {
            Value::Integer(v) => Ok(*v),
            other => Err(Error::Unsupported(format!(
                "hash index key must be an integer, got {}",
                other
            ))),
        }
    }

    /// Exact-match probe: at most one rid.
    pub fn scan_key(&self, key: &Tuple, _txn: &Transaction) -> Result<Vec<Rid>> {
        let key = Self::key_value(key)?;
        Ok(self.table.get(&key)?.into_iter().collect())
    }

    pub fn insert_entry(&self, key: &Tuple, rid: Rid, _txn: &Transaction) -> Result<bool> {
        let key = Self::key_value(key)?;
        self.table.insert(&key, &rid)
    }

    pub fn delete_entry(&self, key: &Tuple, _rid: Rid, _txn: &Transaction) -> Result<bool> {
        let key = Self::key_value(key)?;
        self.table.remove(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DiskManager;
    use tempfile::tempdir;

    fn create_index() -> (HashIndex, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        let bpm = Arc::new(BufferPoolManager::new(64, 2, dm));
        (HashIndex::new(bpm).unwrap(), dir)
    }

    fn key(v: i64) -> Tuple {
        Tuple::new(vec![Value::Integer(v)])
    }

    #[test]
    fn test_insert_scan_delete() {
        let (index, _dir) = create_index();
        let txn = Transaction;

        assert!(index.insert_entry(&key(42), Rid::new(0, 7), &txn).unwrap());
        assert_eq!(index.scan_key(&key(42), &txn).unwrap(), vec![Rid::new(0, 7)]);
        assert!(index.scan_key(&key(43), &txn).unwrap().is_empty());

        assert!(index.delete_entry(&key(42), Rid::new(0, 7), &txn).unwrap());
        assert!(index.scan_key(&key(42), &txn).unwrap().is_empty());
    }

    #[test]
    fn test_non_integer_key_rejected() {
        let (index, _dir) = create_index();
        let txn = Transaction;

        let bad = Tuple::new(vec![Value::Null]);
        assert!(index.scan_key(&bad, &txn).is_err());
    }
}
