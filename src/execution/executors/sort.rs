//! Sort executor.

use std::cmp::Ordering;

use crate::catalog::Schema;
use crate::common::{Result, Rid};
use crate::execution::executor::Executor;
use crate::execution::plan::{OrderBy, OrderByType};
use crate::types::Tuple;

/// Lexicographic comparison over the ordered sort criteria: the first
/// differing key decides.
pub(crate) fn compare_by_order(
    order_bys: &[OrderBy],
    schema: &Schema,
    a: &Tuple,
    b: &Tuple,
) -> Ordering {
    for (direction, expr) in order_bys {
        let left = expr.evaluate(a, schema);
        let right = expr.evaluate(b, schema);
        let ordering = match direction {
            OrderByType::Asc => left.cmp(&right),
            OrderByType::Desc => right.cmp(&left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Materializes the child, stable-sorts, and replays.
pub struct SortExecutor {
    child: Box<dyn Executor>,
    order_bys: Vec<OrderBy>,
    schema: Schema,
    tuples: Vec<(Tuple, Rid)>,
    cursor: usize,
}

impl SortExecutor {
    pub fn new(child: Box<dyn Executor>, order_bys: Vec<OrderBy>, schema: Schema) -> Self {
        Self {
            child,
            order_bys,
            schema,
            tuples: Vec::new(),
            cursor: 0,
        }
    }
}

impl Executor for SortExecutor {
    fn init(&mut self) -> Result<()> {
        self.tuples.clear();
        self.cursor = 0;
        self.child.init()?;
        while let Some(row) = self.child.next()? {
            self.tuples.push(row);
        }
        let order_bys = std::mem::take(&mut self.order_bys);
        let schema = self.child.schema().clone();
        // Vec::sort_by is stable, so equal keys keep their child order.
        self.tuples
            .sort_by(|(a, _), (b, _)| compare_by_order(&order_bys, &schema, a, b));
        self.order_bys = order_bys;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        if self.cursor >= self.tuples.len() {
            return Ok(None);
        }
        let row = self.tuples[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(row))
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
