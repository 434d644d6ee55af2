//! Top-N executor.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::catalog::Schema;
use crate::common::{Result, Rid};
use crate::execution::executor::Executor;
use crate::execution::executors::sort::compare_by_order;
use crate::execution::plan::OrderBy;
use crate::types::Tuple;

/// Heap entry ordered by the sort criteria, so the max-heap's top is the
/// row furthest down the sort order, i.e. the one to evict when a better
/// row arrives.
struct HeapRow {
    tuple: Tuple,
    rid: Rid,
    order_bys: Arc<Vec<OrderBy>>,
    schema: Arc<Schema>,
}

impl PartialEq for HeapRow {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapRow {}

impl PartialOrd for HeapRow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapRow {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_by_order(&self.order_bys, &self.schema, &self.tuple, &other.tuple)
    }
}

/// Keeps the best `n` rows of the child in a bounded heap, then replays
/// them in sort order.
pub struct TopNExecutor {
    child: Box<dyn Executor>,
    order_bys: Arc<Vec<OrderBy>>,
    n: usize,
    schema: Schema,
    sorted: Vec<(Tuple, Rid)>,
    cursor: usize,
}

impl TopNExecutor {
    pub fn new(child: Box<dyn Executor>, order_bys: Vec<OrderBy>, n: usize, schema: Schema) -> Self {
        Self {
            child,
            order_bys: Arc::new(order_bys),
            n,
            schema,
            sorted: Vec::new(),
            cursor: 0,
        }
    }
}

impl Executor for TopNExecutor {
    fn init(&mut self) -> Result<()> {
        self.sorted.clear();
        self.cursor = 0;
        self.child.init()?;

        let child_schema = Arc::new(self.child.schema().clone());
        let mut heap: BinaryHeap<HeapRow> = BinaryHeap::with_capacity(self.n + 1);
        while let Some((tuple, rid)) = self.child.next()? {
            heap.push(HeapRow {
                tuple,
                rid,
                order_bys: Arc::clone(&self.order_bys),
                schema: Arc::clone(&child_schema),
            });
            if heap.len() > self.n {
                // Evict the row furthest down the sort order.
                heap.pop();
            }
        }

        self.sorted = heap
            .into_sorted_vec()
            .into_iter()
            .map(|row| (row.tuple, row.rid))
            .collect();
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        if self.cursor >= self.sorted.len() {
            return Ok(None);
        }
        let row = self.sorted[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(row))
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
