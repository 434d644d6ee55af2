//! Insert executor.

use std::sync::Arc;

use crate::catalog::{Schema, TableOid};
use crate::common::{Result, Rid};
use crate::execution::context::ExecutorContext;
use crate::execution::executor::Executor;
use crate::types::{Tuple, TupleMeta, Value};

/// Consumes the child in full, appending every row to the heap and to
/// every index over the table, then emits one summary tuple with the row
/// count.
pub struct InsertExecutor {
    ctx: Arc<ExecutorContext>,
    child: Box<dyn Executor>,
    table_oid: TableOid,
    schema: Schema,
    done: bool,
}

impl InsertExecutor {
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

impl Executor for InsertExecutor {
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
        while let Some((tuple, _)) = self.child.next()? {
            let rid = table
                .heap
                .insert_tuple(TupleMeta::default(), tuple.clone())
                .expect("heap insert cannot fail");
            for index_info in &indexes {
                let key = tuple.key_from_tuple(index_info.key_attrs());
                index_info.index.insert_entry(&key, rid, self.ctx.txn())?;
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
