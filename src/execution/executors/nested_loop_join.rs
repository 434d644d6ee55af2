//! Nested loop join executor.

use std::sync::Arc;

use crate::catalog::Schema;
use crate::common::{Error, Result, Rid};
use crate::execution::executor::Executor;
use crate::execution::expression::Expression;
use crate::execution::plan::JoinType;
use crate::types::{Tuple, Value};

/// Standard nested iteration: for every left tuple, the right child is
/// restarted and scanned in full.
///
/// For a left join, a null-padded row comes out exactly when no right
/// tuple matched the current left tuple, tracked by a per-left-tuple
/// `no_match` flag.
pub struct NestedLoopJoinExecutor {
    left: Box<dyn Executor>,
    right: Box<dyn Executor>,
    predicate: Arc<Expression>,
    join_type: JoinType,
    schema: Schema,
    left_tuple: Option<Tuple>,
    no_match: bool,
}

impl NestedLoopJoinExecutor {
    pub fn new(
        left: Box<dyn Executor>,
        right: Box<dyn Executor>,
        predicate: Arc<Expression>,
        join_type: JoinType,
        schema: Schema,
    ) -> Result<Self> {
        if !matches!(join_type, JoinType::Inner | JoinType::Left) {
            return Err(Error::Unsupported(format!(
                "join type {:?} not supported",
                join_type
            )));
        }
        Ok(Self {
            left,
            right,
            predicate,
            join_type,
            schema,
            left_tuple: None,
            no_match: true,
        })
    }

    fn joined(&self, left_tuple: &Tuple, right_tuple: &Tuple) -> Tuple {
        let mut values = left_tuple.values().to_vec();
        values.extend(right_tuple.values().iter().cloned());
        Tuple::new(values)
    }

    fn null_padded(&self, left_tuple: &Tuple) -> Tuple {
        let mut values = left_tuple.values().to_vec();
        values.extend(
            std::iter::repeat(Value::Null).take(self.right.schema().column_count()),
        );
        Tuple::new(values)
    }
}

impl Executor for NestedLoopJoinExecutor {
    fn init(&mut self) -> Result<()> {
        self.left.init()?;
        self.right.init()?;
        self.no_match = true;
        self.left_tuple = self.left.next()?.map(|(tuple, _)| tuple);
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        loop {
            let Some(left_tuple) = self.left_tuple.clone() else {
                return Ok(None);
            };

            if let Some((right_tuple, _)) = self.right.next()? {
                let matched = self
                    .predicate
                    .evaluate_join(
                        &left_tuple,
                        self.left.schema(),
                        &right_tuple,
                        self.right.schema(),
                    )
                    .is_true();
                if matched {
                    self.no_match = false;
                    return Ok(Some((self.joined(&left_tuple, &right_tuple), Rid::INVALID)));
                }
            } else {
                // Right side exhausted: maybe pad, then advance the left
                // and restart the right.
                let pad = self.no_match && self.join_type == JoinType::Left;
                self.no_match = true;
                self.left_tuple = self.left.next()?.map(|(tuple, _)| tuple);
                self.right.init()?;
                if pad {
                    return Ok(Some((self.null_padded(&left_tuple), Rid::INVALID)));
                }
            }
        }
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
