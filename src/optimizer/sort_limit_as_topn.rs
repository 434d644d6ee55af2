//! Rewrite: a limit directly above a sort collapses into a top-N.

use crate::execution::plan::PlanNode;
use crate::optimizer::Optimizer;

impl Optimizer {
    /// Bottom-up pass collapsing `Limit(n, Sort(order_bys, child))` into
    /// `TopN(order_bys, n, child)`.
    pub(crate) fn rewrite_sort_limit_as_topn(&self, plan: PlanNode) -> PlanNode {
        let plan = plan.map_children(&mut |child| self.rewrite_sort_limit_as_topn(child));

        if let PlanNode::Limit {
            child,
            limit,
            schema,
        } = plan
        {
            if let PlanNode::Sort {
                child: sort_child,
                order_bys,
                ..
            } = *child
            {
                return PlanNode::TopN {
                    child: sort_child,
                    order_bys,
                    n: limit,
                    schema,
                };
            }
            return PlanNode::Limit {
                child,
                limit,
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
    use crate::execution::expression::Expression;
    use crate::execution::plan::OrderByType;
    use std::sync::Arc;

    fn optimizer() -> Optimizer {
        Optimizer::new(Arc::new(Catalog::new()))
    }

    fn values() -> PlanNode {
        PlanNode::Values {
            rows: vec![],
            schema: Schema::from_names(&["a"]),
        }
    }

    #[test]
    fn test_limit_over_sort_collapses() {
        let plan = PlanNode::Limit {
            child: Box::new(PlanNode::Sort {
                child: Box::new(values()),
                order_bys: vec![(OrderByType::Asc, Expression::column(0))],
                schema: Schema::from_names(&["a"]),
            }),
            limit: 3,
            schema: Schema::from_names(&["a"]),
        };

        let rewritten = optimizer().rewrite_sort_limit_as_topn(plan);
        let PlanNode::TopN { n, order_bys, .. } = rewritten else {
            panic!("expected top-n");
        };
        assert_eq!(n, 3);
        assert_eq!(order_bys.len(), 1);
    }

    #[test]
    fn test_limit_without_sort_stays() {
        let plan = PlanNode::Limit {
            child: Box::new(values()),
            limit: 3,
            schema: Schema::from_names(&["a"]),
        };
        let rewritten = optimizer().rewrite_sort_limit_as_topn(plan);
        assert!(matches!(rewritten, PlanNode::Limit { .. }));
    }

    #[test]
    fn test_sort_without_limit_stays() {
        let plan = PlanNode::Sort {
            child: Box::new(values()),
            order_bys: vec![(OrderByType::Asc, Expression::column(0))],
            schema: Schema::from_names(&["a"]),
        };
        let rewritten = optimizer().rewrite_sort_limit_as_topn(plan);
        assert!(matches!(rewritten, PlanNode::Sort { .. }));
    }
}
