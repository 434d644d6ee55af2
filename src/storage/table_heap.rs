//! Table heap - row storage behind the executors.
//!
//! A deliberately simple latch-protected row store: rows live in a vector,
//! a [`Rid`]'s slot number is the vector index, and deletion is a
//! tombstone in the row's metadata rather than physical removal.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::Rid;
use crate::types::{Tuple, TupleMeta};

/// Row storage for one table.
pub struct TableHeap {
    rows: RwLock<Vec<(TupleMeta, Tuple)>>,
}

impl TableHeap {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Append a row, returning its rid.
    pub fn insert_tuple(&self, meta: TupleMeta, tuple: Tuple) -> Option<Rid> {
        let mut rows = self.rows.write();
        let slot = rows.len() as u32;
        rows.push((meta, tuple));
        Some(Rid::new(0, slot))
    }

    /// Replace a row's metadata (used to set and clear tombstones).
    ///
    /// # Panics
    /// Panics on a rid that was never handed out by this heap.
    pub fn update_tuple_meta(&self, meta: TupleMeta, rid: Rid) {
        let mut rows = self.rows.write();
        rows[rid.slot as usize].0 = meta;
    }

    /// Fetch a row and its metadata.
    ///
    /// # Panics
    /// Panics on a rid that was never handed out by this heap.
    pub fn get_tuple(&self, rid: Rid) -> (TupleMeta, Tuple) {
        let rows = self.rows.read();
        rows[rid.slot as usize].clone()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Snapshot iterator over the rows present right now.
    ///
    /// Rows inserted after the iterator is created are not visited, so an
    /// executor writing to the table it scans cannot chase its own tail.
    pub fn iter(self: &Arc<Self>) -> TableIterator {
        TableIterator {
            heap: Arc::clone(self),
            pos: 0,
            end: self.len() as u32,
        }
    }
}

impl Default for TableHeap {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a [`TableHeap`] snapshot.
///
/// Yields every slot, tombstoned or not; callers filter on
/// [`TupleMeta::is_deleted`].
pub struct TableIterator {
    heap: Arc<TableHeap>,
    pos: u32,
    end: u32,
}

impl TableIterator {
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(TupleMeta, Tuple, Rid)> {
        if self.pos >= self.end {
            return None;
        }
        let rid = Rid::new(0, self.pos);
        self.pos += 1;
        let (meta, tuple) = self.heap.get_tuple(rid);
        Some((meta, tuple, rid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn row(v: i64) -> Tuple {
        Tuple::new(vec![Value::Integer(v)])
    }

    #[test]
    fn test_insert_and_get() {
        let heap = TableHeap::new();
        let rid = heap.insert_tuple(TupleMeta::default(), row(7)).unwrap();

        let (meta, tuple) = heap.get_tuple(rid);
        assert!(!meta.is_deleted);
        assert_eq!(tuple.value(0), &Value::Integer(7));
    }

    #[test]
    fn test_tombstone() {
        let heap = TableHeap::new();
        let rid = heap.insert_tuple(TupleMeta::default(), row(7)).unwrap();

        heap.update_tuple_meta(TupleMeta { is_deleted: true }, rid);
        assert!(heap.get_tuple(rid).0.is_deleted);
    }

    #[test]
    fn test_iterator_snapshot_excludes_new_rows() {
        let heap = Arc::new(TableHeap::new());
        heap.insert_tuple(TupleMeta::default(), row(1)).unwrap();
        heap.insert_tuple(TupleMeta::default(), row(2)).unwrap();

        let mut iter = heap.iter();
        heap.insert_tuple(TupleMeta::default(), row(3)).unwrap();

        let mut seen = vec![];
        while let Some((_, tuple, _)) = iter.next() {
            seen.push(tuple.value(0).clone());
        }
        assert_eq!(seen, vec![Value::Integer(1), Value::Integer(2)]);
    }
}
