//! Expression trees evaluated by the executors.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::catalog::Schema;
use crate::types::{Tuple, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonType {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicType {
    And,
    Or,
}

/// An expression over one tuple, or over a join pair.
///
/// `ColumnRef::tuple_idx` picks the input in a join context: 0 is the
/// outer (left) tuple, 1 the inner (right). Single-tuple evaluation
/// ignores it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    ColumnRef {
        tuple_idx: usize,
        col_idx: usize,
    },
    Constant(Value),
    Comparison {
        comp_type: ComparisonType,
        left: Arc<Expression>,
        right: Arc<Expression>,
    },
    Logic {
        logic_type: LogicType,
        left: Arc<Expression>,
        right: Arc<Expression>,
    },
}

impl Expression {
    /// Column of the (only or left) input.
    pub fn column(col_idx: usize) -> Arc<Expression> {
        Arc::new(Expression::ColumnRef {
            tuple_idx: 0,
            col_idx,
        })
    }

    /// Column of one side of a join.
    pub fn column_of(tuple_idx: usize, col_idx: usize) -> Arc<Expression> {
        Arc::new(Expression::ColumnRef { tuple_idx, col_idx })
    }

    pub fn constant(value: Value) -> Arc<Expression> {
        Arc::new(Expression::Constant(value))
    }

    pub fn comparison(
        comp_type: ComparisonType,
        left: Arc<Expression>,
        right: Arc<Expression>,
    ) -> Arc<Expression> {
        Arc::new(Expression::Comparison {
            comp_type,
            left,
            right,
        })
    }

    pub fn equal(left: Arc<Expression>, right: Arc<Expression>) -> Arc<Expression> {
        Self::comparison(ComparisonType::Equal, left, right)
    }

    pub fn and(left: Arc<Expression>, right: Arc<Expression>) -> Arc<Expression> {
        Arc::new(Expression::Logic {
            logic_type: LogicType::And,
            left,
            right,
        })
    }

    /// Evaluate against a single tuple.
    pub fn evaluate(&self, tuple: &Tuple, schema: &Schema) -> Value {
        match self {
            Expression::ColumnRef { col_idx, .. } => tuple.value(*col_idx).clone(),
            Expression::Constant(value) => value.clone(),
            Expression::Comparison {
                comp_type,
                left,
                right,
            } => compare_values(
                *comp_type,
                &left.evaluate(tuple, schema),
                &right.evaluate(tuple, schema),
            ),
            Expression::Logic {
                logic_type,
                left,
                right,
            } => logic_values(
                *logic_type,
                &left.evaluate(tuple, schema),
                &right.evaluate(tuple, schema),
            ),
        }
    }

    /// Evaluate against a join pair; column refs route by `tuple_idx`.
    pub fn evaluate_join(
        &self,
        left_tuple: &Tuple,
        left_schema: &Schema,
        right_tuple: &Tuple,
        right_schema: &Schema,
    ) -> Value {
        match self {
            Expression::ColumnRef { tuple_idx, col_idx } => {
                let tuple = if *tuple_idx == 0 { left_tuple } else { right_tuple };
                tuple.value(*col_idx).clone()
            }
            Expression::Constant(value) => value.clone(),
            Expression::Comparison {
                comp_type,
                left,
                right,
            } => compare_values(
                *comp_type,
                &left.evaluate_join(left_tuple, left_schema, right_tuple, right_schema),
                &right.evaluate_join(left_tuple, left_schema, right_tuple, right_schema),
            ),
            Expression::Logic {
                logic_type,
                left,
                right,
            } => logic_values(
                *logic_type,
                &left.evaluate_join(left_tuple, left_schema, right_tuple, right_schema),
                &right.evaluate_join(left_tuple, left_schema, right_tuple, right_schema),
            ),
        }
    }
}

/// Same-type comparison; mixing types or touching `Null` yields `Null`.
fn same_type_ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn compare_values(comp_type: ComparisonType, left: &Value, right: &Value) -> Value {
    let Some(ordering) = same_type_ordering(left, right) else {
        return Value::Null;
    };
    let result = match comp_type {
        ComparisonType::Equal => ordering == Ordering::Equal,
        ComparisonType::NotEqual => ordering != Ordering::Equal,
        ComparisonType::LessThan => ordering == Ordering::Less,
        ComparisonType::LessThanOrEqual => ordering != Ordering::Greater,
        ComparisonType::GreaterThan => ordering == Ordering::Greater,
        ComparisonType::GreaterThanOrEqual => ordering != Ordering::Less,
    };
    Value::Boolean(result)
}

fn logic_values(logic_type: LogicType, left: &Value, right: &Value) -> Value {
    let result = match logic_type {
        LogicType::And => left.is_true() && right.is_true(),
        LogicType::Or => left.is_true() || right.is_true(),
    };
    Value::Boolean(result)
}
