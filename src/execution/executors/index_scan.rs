//! Index scan executor.

use std::sync::Arc;

use crate::catalog::{IndexOid, Schema, TableOid};
use crate::common::{Result, Rid};
use crate::execution::context::ExecutorContext;
use crate::execution::executor::Executor;
use crate::types::{Tuple, Value};

/// Exact-equality probe of a single-key hash index: at most one row comes
/// out, and a tombstoned row is suppressed.
pub struct IndexScanExecutor {
    ctx: Arc<ExecutorContext>,
    table_oid: TableOid,
    index_oid: IndexOid,
    pred_key: Value,
    schema: Schema,
    done: bool,
}

impl IndexScanExecutor {
    pub fn new(
        ctx: Arc<ExecutorContext>,
        table_oid: TableOid,
        index_oid: IndexOid,
        pred_key: Value,
        schema: Schema,
    ) -> Self {
        Self {
            ctx,
            table_oid,
            index_oid,
            pred_key,
            schema,
            done: false,
        }
    }
}

impl Executor for IndexScanExecutor {
    fn init(&mut self) -> Result<()> {
        self.done = false;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let catalog = self.ctx.catalog();
        let index_info = catalog.get_index(self.index_oid)?;
        let table = catalog.get_table(self.table_oid)?;

        let key = Tuple::new(vec![self.pred_key.clone()]);
        let rids = index_info.index.scan_key(&key, self.ctx.txn())?;
        let Some(&rid) = rids.first() else {
            return Ok(None);
        };

        let (meta, tuple) = table.heap.get_tuple(rid);
        if meta.is_deleted {
            return Ok(None);
        }
        Ok(Some((tuple, rid)))
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
