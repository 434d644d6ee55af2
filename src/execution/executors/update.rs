//! Update executor.

use std::sync::Arc;

use crate::catalog::{Schema, TableOid};
use crate::common::{Result, Rid};
use crate::execution::context::ExecutorContext;
use crate::execution::executor::Executor;
use crate::execution::expression::Expression;
use crate::types::{Tuple, TupleMeta, Value};

/// Updates as delete-plus-insert: the old row is tombstoned, the new row
/// (built from the target expressions) appended, and every index gets the
/// old key deleted and the new key inserted. One summary tuple comes out.
pub struct UpdateExecutor {
    ctx: Arc<ExecutorContext>,
    child: Box<dyn Executor>,
    table_oid: TableOid,
    target_expressions: Vec<Arc<Expression>>,
    schema: Schema,
    done: bool,
}

impl UpdateExecutor {
    pub fn new(
        ctx: Arc<ExecutorContext>,
        child: Box<dyn Executor>,
        table_oid: TableOid,
        target_expressions: Vec<Arc<Expression>>,
        schema: Schema,
    ) -> Self {
        Self {
            ctx,
            child,
            table_oid,
            target_expressions,
            schema,
            done: false,
        }
    }
}

impl Executor for UpdateExecutor {
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
        while let Some((old_tuple, rid)) = self.child.next()? {
            // Tombstone the old version.
            table
                .heap
                .update_tuple_meta(TupleMeta { is_deleted: true }, rid);

            // Build and append the new version.
            let values: Vec<Value> = self
                .target_expressions
                .iter()
                .map(|e| e.evaluate(&old_tuple, self.child.schema()))
                .collect();
            let new_tuple = Tuple::new(values);
            let new_rid = table
                .heap
                .insert_tuple(TupleMeta::default(), new_tuple.clone())
                .expect("heap insert cannot fail");

            // Per index: out with the old key, in with the new.
            for index_info in &indexes {
                let old_key = old_tuple.key_from_tuple(index_info.key_attrs());
                let new_key = new_tuple.key_from_tuple(index_info.key_attrs());
                index_info.index.delete_entry(&old_key, rid, self.ctx.txn())?;
                index_info
                    .index
                    .insert_entry(&new_key, new_rid, self.ctx.txn())?;
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
