//! Sequential scan executor.

use std::sync::Arc;

use crate::catalog::{Schema, TableOid};
use crate::common::{Result, Rid};
use crate::execution::context::ExecutorContext;
use crate::execution::executor::Executor;
use crate::execution::expression::Expression;
use crate::storage::TableIterator;
use crate::types::Tuple;

/// Walks the table heap, skipping tombstones and rows failing the optional
/// filter predicate.
pub struct SeqScanExecutor {
    ctx: Arc<ExecutorContext>,
    table_oid: TableOid,
    filter: Option<Arc<Expression>>,
    schema: Schema,
    iter: Option<TableIterator>,
}

impl SeqScanExecutor {
    pub fn new(
        ctx: Arc<ExecutorContext>,
        table_oid: TableOid,
        filter: Option<Arc<Expression>>,
        schema: Schema,
    ) -> Self {
        Self {
            ctx,
            table_oid,
            filter,
            schema,
            iter: None,
        }
    }
}

impl Executor for SeqScanExecutor {
    fn init(&mut self) -> Result<()> {
        let table = self.ctx.catalog().get_table(self.table_oid)?;
        self.iter = Some(table.heap.iter());
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        let iter = self.iter.as_mut().expect("init() not called");
        while let Some((meta, tuple, rid)) = iter.next() {
            if meta.is_deleted {
                continue;
            }
            if let Some(filter) = &self.filter {
                if !filter.evaluate(&tuple, &self.schema).is_true() {
                    continue;
                }
            }
            return Ok(Some((tuple, rid)));
        }
        Ok(None)
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
