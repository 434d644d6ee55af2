//! Rule-based plan rewrites.
//!
//! Three rules, each applied bottom-up (children first):
//! 1. Nested loop join over equi-conditions → hash join
//! 2. Sequential scan with a `column = constant` filter → index scan
//! 3. Limit directly above a sort → top-N

mod nlj_as_hash_join;
mod seq_scan_as_index_scan;
mod sort_limit_as_topn;

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::execution::plan::PlanNode;

/// Applies the rewrite rules to a plan tree.
pub struct Optimizer {
    catalog: Arc<Catalog>,
}

impl Optimizer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub(crate) fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Run every rule over the plan.
    pub fn optimize(&self, plan: PlanNode) -> PlanNode {
        let plan = self.rewrite_nlj_as_hash_join(plan);
        let plan = self.rewrite_seq_scan_as_index_scan(plan);
        self.rewrite_sort_limit_as_topn(plan)
    }
}
