//! Hash join executor.

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::Schema;
use crate::common::{Error, Result, Rid};
use crate::execution::executor::Executor;
use crate::execution::expression::Expression;
use crate::execution::plan::JoinType;
use crate::types::{Tuple, Value};

/// Builds a multimap over the right child's join keys, then probes it with
/// the left child. The whole output is materialized during
/// [`init`](Executor::init) and handed out tuple by tuple.
///
/// Only inner and left joins are executable; anything else is rejected at
/// construction.
pub struct HashJoinExecutor {
    left: Box<dyn Executor>,
    right: Box<dyn Executor>,
    left_key_expressions: Vec<Arc<Expression>>,
    right_key_expressions: Vec<Arc<Expression>>,
    join_type: JoinType,
    schema: Schema,
    output: Vec<Tuple>,
    cursor: usize,
}

impl HashJoinExecutor {
    pub fn new(
        left: Box<dyn Executor>,
        right: Box<dyn Executor>,
        left_key_expressions: Vec<Arc<Expression>>,
        right_key_expressions: Vec<Arc<Expression>>,
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
            left_key_expressions,
            right_key_expressions,
            join_type,
            schema,
            output: Vec::new(),
            cursor: 0,
        })
    }

    fn key_of(tuple: &Tuple, schema: &Schema, exprs: &[Arc<Expression>]) -> Vec<Value> {
        exprs.iter().map(|e| e.evaluate(tuple, schema)).collect()
    }
}

impl Executor for HashJoinExecutor {
    fn init(&mut self) -> Result<()> {
        self.output.clear();
        self.cursor = 0;
        self.left.init()?;
        self.right.init()?;

        // Build phase over the right child.
        let mut table: HashMap<Vec<Value>, Vec<Tuple>> = HashMap::new();
        while let Some((tuple, _)) = self.right.next()? {
            let key = Self::key_of(&tuple, self.right.schema(), &self.right_key_expressions);
            table.entry(key).or_default().push(tuple);
        }

        // Probe phase with the left child.
        let right_width = self.right.schema().column_count();
        while let Some((tuple, _)) = self.left.next()? {
            let key = Self::key_of(&tuple, self.left.schema(), &self.left_key_expressions);
            match table.get(&key) {
                Some(matches) => {
                    for right_tuple in matches {
                        let mut values = tuple.values().to_vec();
                        values.extend(right_tuple.values().iter().cloned());
                        self.output.push(Tuple::new(values));
                    }
                }
                None => {
                    if self.join_type == JoinType::Left {
                        let mut values = tuple.values().to_vec();
                        values.extend(std::iter::repeat(Value::Null).take(right_width));
                        self.output.push(Tuple::new(values));
                    }
                }
            }
        }
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        if self.cursor >= self.output.len() {
            return Ok(None);
        }
        let tuple = self.output[self.cursor].clone();
        self.cursor += 1;
        Ok(Some((tuple, Rid::INVALID)))
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
