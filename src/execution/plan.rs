//! Query plan trees.
//!
//! Plans are produced by whatever sits above this crate (tests build them
//! by hand), rewritten by the optimizer, and turned into executor trees by
//! the factory in [`super::executor`].

use std::sync::Arc;

use crate::catalog::{IndexOid, Schema, TableOid};
use crate::execution::expression::Expression;
use crate::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderByType {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationType {
    CountStar,
    Count,
    Sum,
    Min,
    Max,
}

/// One sort criterion: direction plus the expression producing the key.
pub type OrderBy = (OrderByType, Arc<Expression>);

/// A node of the plan tree.
///
/// Every variant carries its output schema so executors and rewrites can
/// reason about shapes without consulting the catalog.
#[derive(Debug, Clone)]
pub enum PlanNode {
    /// Literal rows; the usual source below an insert.
    Values { rows: Vec<Vec<Value>>, schema: Schema },
    SeqScan {
        table_oid: TableOid,
        filter: Option<Arc<Expression>>,
        schema: Schema,
    },
    /// Exact-equality probe of a single-key hash index.
    IndexScan {
        table_oid: TableOid,
        index_oid: IndexOid,
        pred_key: Value,
        schema: Schema,
    },
    NestedLoopJoin {
        left: Box<PlanNode>,
        right: Box<PlanNode>,
        predicate: Arc<Expression>,
        join_type: JoinType,
        schema: Schema,
    },
    HashJoin {
        left: Box<PlanNode>,
        right: Box<PlanNode>,
        left_key_expressions: Vec<Arc<Expression>>,
        right_key_expressions: Vec<Arc<Expression>>,
        join_type: JoinType,
        schema: Schema,
    },
    Aggregation {
        child: Box<PlanNode>,
        group_bys: Vec<Arc<Expression>>,
        aggregates: Vec<(AggregationType, Arc<Expression>)>,
        schema: Schema,
    },
    Sort {
        child: Box<PlanNode>,
        order_bys: Vec<OrderBy>,
        schema: Schema,
    },
    Limit {
        child: Box<PlanNode>,
        limit: usize,
        schema: Schema,
    },
    TopN {
        child: Box<PlanNode>,
        order_bys: Vec<OrderBy>,
        n: usize,
        schema: Schema,
    },
    Insert {
        child: Box<PlanNode>,
        table_oid: TableOid,
        schema: Schema,
    },
    Update {
        child: Box<PlanNode>,
        table_oid: TableOid,
        target_expressions: Vec<Arc<Expression>>,
        schema: Schema,
    },
    Delete {
        child: Box<PlanNode>,
        table_oid: TableOid,
        schema: Schema,
    },
}

impl PlanNode {
    pub fn schema(&self) -> &Schema {
        match self {
            PlanNode::Values { schema, .. }
            | PlanNode::SeqScan { schema, .. }
            | PlanNode::IndexScan { schema, .. }
            | PlanNode::NestedLoopJoin { schema, .. }
            | PlanNode::HashJoin { schema, .. }
            | PlanNode::Aggregation { schema, .. }
            | PlanNode::Sort { schema, .. }
            | PlanNode::Limit { schema, .. }
            | PlanNode::TopN { schema, .. }
            | PlanNode::Insert { schema, .. }
            | PlanNode::Update { schema, .. }
            | PlanNode::Delete { schema, .. } => schema,
        }
    }

    /// Rebuild this node with `f` applied to each child.
    ///
    /// The rewrite rules use this for their children-first traversal.
    pub fn map_children(self, f: &mut impl FnMut(PlanNode) -> PlanNode) -> PlanNode {
        match self {
            PlanNode::NestedLoopJoin {
                left,
                right,
                predicate,
                join_type,
                schema,
            } => PlanNode::NestedLoopJoin {
                left: Box::new(f(*left)),
                right: Box::new(f(*right)),
                predicate,
                join_type,
                schema,
            },
            PlanNode::HashJoin {
                left,
                right,
                left_key_expressions,
                right_key_expressions,
                join_type,
                schema,
            } => PlanNode::HashJoin {
                left: Box::new(f(*left)),
                right: Box::new(f(*right)),
                left_key_expressions,
                right_key_expressions,
                join_type,
                schema,
            },
            PlanNode::Aggregation {
                child,
                group_bys,
                aggregates,
                schema,
            } => PlanNode::Aggregation {
                child: Box::new(f(*child)),
                group_bys,
                aggregates,
                schema,
            },
            PlanNode::Sort {
                child,
                order_bys,
                schema,
            } => PlanNode::Sort {
                child: Box::new(f(*child)),
                order_bys,
                schema,
            },
            PlanNode::Limit {
                child,
                limit,
                schema,
            } => PlanNode::Limit {
                child: Box::new(f(*child)),
                limit,
                schema,
            },
            PlanNode::TopN {
                child,
                order_bys,
                n,
                schema,
            } => PlanNode::TopN {
                child: Box::new(f(*child)),
                order_bys,
                n,
                schema,
            },
            PlanNode::Insert {
                child,
                table_oid,
                schema,
            } => PlanNode::Insert {
                child: Box::new(f(*child)),
                table_oid,
                schema,
            },
            PlanNode::Update {
                child,
                table_oid,
                target_expressions,
                schema,
            } => PlanNode::Update {
                child: Box::new(f(*child)),
                table_oid,
                target_expressions,
                schema,
            },
            PlanNode::Delete {
                child,
                table_oid,
                schema,
            } => PlanNode::Delete {
                child: Box::new(f(*child)),
                table_oid,
                schema,
            },
            leaf @ (PlanNode::Values { .. }
            | PlanNode::SeqScan { .. }
            | PlanNode::IndexScan { .. }) => leaf,
        }
    }

    // Convenience constructors; the write plans fix their summary schema.

    pub fn insert(child: PlanNode, table_oid: TableOid) -> PlanNode {
        PlanNode::Insert {
            child: Box::new(child),
            table_oid,
            schema: Schema::from_names(&["Inserted_Rows"]),
        }
    }

    pub fn update(
        child: PlanNode,
        table_oid: TableOid,
        target_expressions: Vec<Arc<Expression>>,
    ) -> PlanNode {
        PlanNode::Update {
            child: Box::new(child),
            table_oid,
            target_expressions,
            schema: Schema::from_names(&["Updated_Rows"]),
        }
    }

    pub fn delete(child: PlanNode, table_oid: TableOid) -> PlanNode {
        PlanNode::Delete {
            child: Box::new(child),
            table_oid,
            schema: Schema::from_names(&["Deleted_Rows"]),
        }
    }
}
