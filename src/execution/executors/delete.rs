//! Delete executor.

use std::sync::Arc;

use crate::catalog::{Schema, TableOid};
use crate::common::{Result, Rid};
use crate::execution::context::ExecutorContext;
use crate::execution::executor::Executor;
use crate::types::{Tuple, TupleMeta, Value};

/// Tombstones every row the child produces and removes its keys from the
/// table's indexes, then emits one summary tuple with the row count.
pub struct DeleteExecutor {
    ctx: Arc<ExecutorContext>,
    child: Box<dyn Executor>,
    table_oid: TableOid,
    schema: Schema,
    done: bool,
}

impl DeleteExecutor {
    pub fn new(
        ctx: Arc<ExecutorContext>,
        child: Box<dyn Executor>,
        table_oid: TableOid,
        schema: Schema,
    ) -> Self {
        Self {
            ctx,
            child,
            table_oid,
            schema,
            done: false,
        }
    }
}

impl Executor for DeleteExecutor {
    fn init(&mut self) -> Result<()> {
        self.done = false;
        self.child.init()
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let catalog = self.ctx.catalog();
        let table = catalog.get_table(self.table_oid)?;
        let indexes = catalog.get_table_indexes(&table.name);

        let mut rows: i64 = 0;
        while let Some((tuple, rid)) = self.child.next()? {
            table
                .heap
                .update_tuple_meta(TupleMeta { is_deleted: true }, rid);
            for index_info in &indexes {
                let key = tuple.key_from_tuple(index_info.key_attrs());
                index_info.index.delete_entry(&key, rid, self.ctx.txn())?;
            }
            rows += 1;
        }

        Ok(Some((
            Tuple::new(vec![Value::Integer(rows)]),
            Rid::INVALID,
        )))
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
