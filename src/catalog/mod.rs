//! Catalog - tables, indexes, and their schemas.
//!
//! The executors reach everything through here: a plan names a table or
//! index by oid, and the catalog resolves it to the heap or index object.

mod schema;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{Error, Result};
use crate::index::HashIndex;
use crate::storage::TableHeap;
use crate::types::TupleMeta;

pub use schema::{Column, Schema};

pub type TableOid = u32;
pub type IndexOid = u32;

/// Everything known about one table.
pub struct TableInfo {
    pub oid: TableOid,
    pub name: String,
    pub schema: Schema,
    pub heap: Arc<TableHeap>,
}

/// Everything known about one index.
pub struct IndexInfo {
    pub index_oid: IndexOid,
    pub name: String,
    /// Shape of the key tuples this index stores.
    pub key_schema: Schema,
    /// Which table columns make up the key.
    pub key_attrs: Vec<usize>,
    pub index: Arc<HashIndex>,
}

impl IndexInfo {
    pub fn key_attrs(&self) -> &[usize] {
        &self.key_attrs
    }
}

#[derive(Default)]
struct CatalogState {
    tables: HashMap<TableOid, Arc<TableInfo>>,
    table_names: HashMap<String, TableOid>,
    indexes: HashMap<IndexOid, Arc<IndexInfo>>,
    /// Index oids per table name.
    table_indexes: HashMap<String, Vec<IndexOid>>,
    next_table_oid: TableOid,
    next_index_oid: IndexOid,
}

/// Registry of tables and indexes.
///
/// Interior latching makes `&self` methods safe to call from executor
/// trees that share the catalog through an `Arc`.
#[derive(Default)]
pub struct Catalog {
    state: RwLock<CatalogState>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new empty table.
    pub fn create_table(&self, name: impl Into<String>, schema: Schema) -> Arc<TableInfo> {
        let name = name.into();
        let mut state = self.state.write();
        let oid = state.next_table_oid;
        state.next_table_oid += 1;

        let info = Arc::new(TableInfo {
            oid,
            name: name.clone(),
            schema,
            heap: Arc::new(TableHeap::new()),
        });
        state.tables.insert(oid, Arc::clone(&info));
        state.table_names.insert(name, oid);
        info
    }

    pub fn get_table(&self, oid: TableOid) -> Result<Arc<TableInfo>> {
        self.state
            .read()
            .tables
            .get(&oid)
            .cloned()
            .ok_or(Error::TableNotFound(oid))
    }

    pub fn get_table_by_name(&self, name: &str) -> Option<Arc<TableInfo>> {
        let state = self.state.read();
        let oid = state.table_names.get(name)?;
        state.tables.get(oid).cloned()
    }

    /// Register an index over `table_name`, keyed by the columns in
    /// `key_attrs`, and backfill it from the rows already in the heap.
    pub fn create_index(
        &self,
        index_name: impl Into<String>,
        table_name: &str,
        key_attrs: Vec<usize>,
        index: HashIndex,
    ) -> Result<Arc<IndexInfo>> {
        let table = self
            .get_table_by_name(table_name)
            .ok_or_else(|| Error::Unsupported(format!("no such table: {}", table_name)))?;

        let index = Arc::new(index);
        let txn = crate::execution::Transaction;
        let mut iter = table.heap.iter();
        while let Some((meta, tuple, rid)) = iter.next() {
            if meta.is_deleted {
                continue;
            }
            let key = tuple.key_from_tuple(&key_attrs);
            index.insert_entry(&key, rid, &txn)?;
        }

        let mut state = self.state.write();
        let index_oid = state.next_index_oid;
        state.next_index_oid += 1;

        let info = Arc::new(IndexInfo {
            index_oid,
            name: index_name.into(),
            key_schema: table.schema.project(&key_attrs),
            key_attrs,
            index,
        });
        state.indexes.insert(index_oid, Arc::clone(&info));
        state
            .table_indexes
            .entry(table_name.to_string())
            .or_default()
            .push(index_oid);
        Ok(info)
    }

    pub fn get_index(&self, oid: IndexOid) -> Result<Arc<IndexInfo>> {
        self.state
            .read()
            .indexes
            .get(&oid)
            .cloned()
            .ok_or(Error::IndexNotFound(oid))
    }

    /// All indexes registered over `table_name`.
    pub fn get_table_indexes(&self, table_name: &str) -> Vec<Arc<IndexInfo>> {
        let state = self.state.read();
        state
            .table_indexes
            .get(table_name)
            .map(|oids| {
                oids.iter()
                    .filter_map(|oid| state.indexes.get(oid).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Insert a row through the catalog is not supported; executors talk to
    /// the heap directly. This helper seeds test tables.
    pub fn seed_table(&self, oid: TableOid, rows: Vec<crate::types::Tuple>) -> Result<()> {
        let table = self.get_table(oid)?;
        for tuple in rows {
            table.heap.insert_tuple(TupleMeta::default(), tuple);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferPoolManager;
    use crate::execution::Transaction;
    use crate::storage::DiskManager;
    use crate::types::{Tuple, Value};
    use tempfile::tempdir;

    #[test]
    fn test_create_and_lookup_table() {
        let catalog = Catalog::new();
        let info = catalog.create_table("t", Schema::from_names(&["a", "b"]));

        assert_eq!(catalog.get_table(info.oid).unwrap().name, "t");
        assert!(catalog.get_table_by_name("t").is_some());
        assert!(catalog.get_table(99).is_err());
    }

    #[test]
    fn test_create_index_backfills_existing_rows() {
        let dir = tempdir().unwrap();
        let dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        let bpm = Arc::new(BufferPoolManager::new(64, 2, dm));

        let catalog = Catalog::new();
        let info = catalog.create_table("t", Schema::from_names(&["a"]));
        catalog
            .seed_table(
                info.oid,
                vec![
                    Tuple::new(vec![Value::Integer(10)]),
                    Tuple::new(vec![Value::Integer(20)]),
                ],
            )
            .unwrap();

        let index = catalog
            .create_index("t_a", "t", vec![0], HashIndex::new(bpm).unwrap())
            .unwrap();

        let txn = Transaction;
        let key = Tuple::new(vec![Value::Integer(20)]);
        let rids = index.index.scan_key(&key, &txn).unwrap();
        assert_eq!(rids.len(), 1);
        assert_eq!(catalog.get_table_indexes("t").len(), 1);
        assert!(catalog.get_table_indexes("absent").is_empty());
    }
}
