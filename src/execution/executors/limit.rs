//! Limit executor.

use crate::catalog::Schema;
use crate::common::{Result, Rid};
use crate::execution::executor::Executor;
use crate::types::Tuple;

/// Passes through at most `limit` rows of the child.
pub struct LimitExecutor {
    child: Box<dyn Executor>,
    limit: usize,
    schema: Schema,
    emitted: usize,
}

impl LimitExecutor {
    pub fn new(child: Box<dyn Executor>, limit: usize, schema: Schema) -> Self {
        Self {
            child,
            limit,
            schema,
            emitted: 0,
        }
    }
}

impl Executor for LimitExecutor {
    fn init(&mut self) -> Result<()> {
        self.emitted = 0;
        self.child.init()
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        if self.emitted >= self.limit {
            return Ok(None);
        }
        match self.child.next()? {
            Some(row) => {
                self.emitted += 1;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
