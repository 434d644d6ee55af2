//! Aggregation executor.

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::Schema;
use crate::common::{Result, Rid};
use crate::execution::executor::Executor;
use crate::execution::expression::Expression;
use crate::execution::plan::AggregationType;
use crate::types::{Tuple, Value};

/// Consumes the child in full during [`init`](Executor::init), folding
/// rows into a hash table keyed by the group-by values; `next` walks the
/// finished groups.
///
/// With no input rows and no group-by columns, one row holding the initial
/// aggregate values comes out (`COUNT(*)` over an empty table is 0, not
/// absent). With group-by columns, an empty input produces no groups.
pub struct AggregationExecutor {
    child: Box<dyn Executor>,
    group_bys: Vec<Arc<Expression>>,
    aggregates: Vec<(AggregationType, Arc<Expression>)>,
    schema: Schema,
    results: Vec<Tuple>,
    cursor: usize,
}

impl AggregationExecutor {
    pub fn new(
        child: Box<dyn Executor>,
        group_bys: Vec<Arc<Expression>>,
        aggregates: Vec<(AggregationType, Arc<Expression>)>,
        schema: Schema,
    ) -> Self {
        Self {
            child,
            group_bys,
            aggregates,
            schema,
            results: Vec::new(),
            cursor: 0,
        }
    }

    fn initial_values(&self) -> Vec<Value> {
        self.aggregates
            .iter()
            .map(|(agg, _)| match agg {
                AggregationType::CountStar => Value::Integer(0),
                _ => Value::Null,
            })
            .collect()
    }

    fn combine(states: &mut [Value], aggregates: &[(AggregationType, Arc<Expression>)], inputs: Vec<Value>) {
        for ((state, (agg, _)), input) in states.iter_mut().zip(aggregates).zip(inputs) {
            match agg {
                AggregationType::CountStar => {
                    *state = Value::Integer(state.as_i64().unwrap_or(0) + 1);
                }
                AggregationType::Count => {
                    if !input.is_null() {
                        *state = Value::Integer(state.as_i64().unwrap_or(0) + 1);
                    }
                }
                AggregationType::Sum => {
                    if let Some(v) = input.as_i64() {
                        *state = Value::Integer(state.as_i64().unwrap_or(0) + v);
                    }
                }
                AggregationType::Min => {
                    if !input.is_null() && (state.is_null() || input < *state) {
                        *state = input;
                    }
                }
                AggregationType::Max => {
                    if !input.is_null() && (state.is_null() || input > *state) {
                        *state = input;
                    }
                }
            }
        }
    }
}

impl Executor for AggregationExecutor {
    fn init(&mut self) -> Result<()> {
        self.results.clear();
        self.cursor = 0;
        self.child.init()?;

        let mut groups: HashMap<Vec<Value>, Vec<Value>> = HashMap::new();
        let mut saw_input = false;
        while let Some((tuple, _)) = self.child.next()? {
            saw_input = true;
            let key: Vec<Value> = self
                .group_bys
                .iter()
                .map(|e| e.evaluate(&tuple, self.child.schema()))
                .collect();
            let inputs: Vec<Value> = self
                .aggregates
                .iter()
                .map(|(_, e)| e.evaluate(&tuple, self.child.schema()))
                .collect();
            let states = groups.entry(key).or_insert_with(|| self.initial_values());
            Self::combine(states, &self.aggregates, inputs);
        }

        if !saw_input {
            // Emit the initial aggregates only when the output is all
            // aggregates, i.e. there is nothing to group by.
            let initial = self.initial_values();
            if initial.len() == self.schema.column_count() {
                self.results.push(Tuple::new(initial));
            }
            return Ok(());
        }

        for (key, states) in groups {
            let mut values = key;
            values.extend(states);
            self.results.push(Tuple::new(values));
        }
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>> {
        if self.cursor >= self.results.len() {
            return Ok(None);
        }
        let tuple = self.results[self.cursor].clone();
        self.cursor += 1;
        Ok(Some((tuple, Rid::INVALID)))
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }
}
