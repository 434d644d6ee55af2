//! Rewrite: nested loop join over equi-conditions becomes a hash join.

use std::sync::Arc;

use crate::execution::expression::{ComparisonType, Expression, LogicType};
use crate::execution::plan::PlanNode;
use crate::optimizer::Optimizer;

/// Split a conjunction of `left_col = right_col` equalities into aligned
/// key lists, one expression per side per conjunct.
///
/// Anything else disqualifies: an inequality, a non-AND connective, a
/// non-column operand, or both columns coming from the same input.
fn extract_equi_keys(
    expr: &Expression,
    left_keys: &mut Vec<Arc<Expression>>,
    right_keys: &mut Vec<Arc<Expression>>,
) -> bool {
    match expr {
        Expression::Comparison {
            comp_type: ComparisonType::Equal,
            left,
            right,
        } => {
            let (Expression::ColumnRef { tuple_idx: l_idx, .. }, Expression::ColumnRef { tuple_idx: r_idx, .. }) =
                (left.as_ref(), right.as_ref())
            else {
                return false;
            };
            match (*l_idx, *r_idx) {
                (0, 1) => {
                    left_keys.push(Arc::clone(left));
                    right_keys.push(Arc::clone(right));
                    true
                }
                (1, 0) => {
                    left_keys.push(Arc::clone(right));
                    right_keys.push(Arc::clone(left));
                    true
                }
                _ => false,
            }
        }
        Expression::Logic {
            logic_type: LogicType::And,
            left,
            right,
        } => {
            extract_equi_keys(left, left_keys, right_keys)
                && extract_equi_keys(right, left_keys, right_keys)
        }
        _ => false,
    }
}

impl Optimizer {
    /// Bottom-up pass turning qualifying nested loop joins into hash joins.
    pub(crate) fn rewrite_nlj_as_hash_join(&self, plan: PlanNode) -> PlanNode {
        let plan = plan.map_children(&mut |child| self.rewrite_nlj_as_hash_join(child));

        if let PlanNode::NestedLoopJoin {
            left,
            right,
            predicate,
            join_type,
            schema,
        } = plan
        {
            let mut left_keys = Vec::new();
            let mut right_keys = Vec::new();
            if extract_equi_keys(&predicate, &mut left_keys, &mut right_keys) {
                return PlanNode::HashJoin {
                    left,
                    right,
                    left_key_expressions: left_keys,
                    right_key_expressions: right_keys,
                    join_type,
                    schema,
                };
            }
            return PlanNode::NestedLoopJoin {
                left,
                right,
                predicate,
                join_type,
                schema,
            };
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Schema};
    use crate::execution::plan::JoinType;
    use crate::types::Value;

    fn nlj(predicate: Arc<Expression>) -> PlanNode {
        let left = PlanNode::Values {
            rows: vec![],
            schema: Schema::from_names(&["a"]),
        };
        let right = PlanNode::Values {
            rows: vec![],
            schema: Schema::from_names(&["b"]),
        };
        PlanNode::NestedLoopJoin {
            left: Box::new(left),
            right: Box::new(right),
            predicate,
            join_type: JoinType::Inner,
            schema: Schema::from_names(&["a", "b"]),
        }
    }

    fn optimizer() -> Optimizer {
        Optimizer::new(std::sync::Arc::new(Catalog::new()))
    }

    #[test]
    fn test_single_equality_rewrites() {
        let predicate = Expression::equal(Expression::column_of(0, 0), Expression::column_of(1, 0));
        let rewritten = optimizer().rewrite_nlj_as_hash_join(nlj(predicate));
        assert!(matches!(rewritten, PlanNode::HashJoin { .. }));
    }

    #[test]
    fn test_reversed_sides_align() {
        // right_col = left_col still maps the left column to the left keys.
        let predicate = Expression::equal(Expression::column_of(1, 0), Expression::column_of(0, 0));
        let rewritten = optimizer().rewrite_nlj_as_hash_join(nlj(predicate));
        let PlanNode::HashJoin {
            left_key_expressions,
            right_key_expressions,
            ..
        } = rewritten
        else {
            panic!("expected hash join");
        };
        assert_eq!(
            left_key_expressions[0].as_ref(),
            &Expression::ColumnRef {
                tuple_idx: 0,
                col_idx: 0
            }
        );
        assert_eq!(
            right_key_expressions[0].as_ref(),
            &Expression::ColumnRef {
                tuple_idx: 1,
                col_idx: 0
            }
        );
    }

    #[test]
    fn test_conjunction_of_equalities_rewrites() {
        let predicate = Expression::and(
            Expression::equal(Expression::column_of(0, 0), Expression::column_of(1, 0)),
            Expression::equal(Expression::column_of(1, 0), Expression::column_of(0, 0)),
        );
        let rewritten = optimizer().rewrite_nlj_as_hash_join(nlj(predicate));
        let PlanNode::HashJoin {
            left_key_expressions,
            ..
        } = rewritten
        else {
            panic!("expected hash join");
        };
        assert_eq!(left_key_expressions.len(), 2);
    }

    #[test]
    fn test_inequality_disqualifies() {
        let predicate = Expression::comparison(
            ComparisonType::LessThan,
            Expression::column_of(0, 0),
            Expression::column_of(1, 0),
        );
        let rewritten = optimizer().rewrite_nlj_as_hash_join(nlj(predicate));
        assert!(matches!(rewritten, PlanNode::NestedLoopJoin { .. }));
    }

    #[test]
    fn test_same_side_columns_disqualify() {
        let predicate = Expression::equal(Expression::column_of(0, 0), Expression::column_of(0, 0));
        let rewritten = optimizer().rewrite_nlj_as_hash_join(nlj(predicate));
        assert!(matches!(rewritten, PlanNode::NestedLoopJoin { .. }));
    }

    #[test]
    fn test_constant_operand_disqualifies() {
        let predicate = Expression::equal(
            Expression::column_of(0, 0),
            Expression::constant(Value::Integer(3)),
        );
        let rewritten = optimizer().rewrite_nlj_as_hash_join(nlj(predicate));
        assert!(matches!(rewritten, PlanNode::NestedLoopJoin { .. }));
    }
}
