//! The executor abstraction and the plan-to-executor factory.

use std::sync::Arc;

use crate::catalog::Schema;
use crate::common::{Result, Rid};
use crate::execution::context::ExecutorContext;
use crate::execution::executors::{
    AggregationExecutor, DeleteExecutor, HashJoinExecutor, IndexScanExecutor, InsertExecutor,
    LimitExecutor, NestedLoopJoinExecutor, SeqScanExecutor, SortExecutor, TopNExecutor,
    UpdateExecutor, ValuesExecutor,
};
use crate::execution::plan::PlanNode;
use crate::types::Tuple;

/// A pull-based executor.
///
/// The driver calls [`init`](Self::init) once (or again to restart), then
/// [`next`](Self::next) until it yields `None`. After that, `next` keeps
/// returning `None`.
pub trait Executor {
    fn init(&mut self) -> Result<()>;

    fn next(&mut self) -> Result<Option<(Tuple, Rid)>>;

    /// Shape of the tuples this executor emits.
    fn schema(&self) -> &Schema;
}

/// Build the executor tree for `plan`.
///
/// Fails fast on constructs the engine does not execute, e.g. join types
/// other than inner and left.
pub fn create_executor(
    ctx: &Arc<ExecutorContext>,
    plan: &PlanNode,
) -> Result<Box<dyn Executor>> {
    match plan {
        PlanNode::Values { rows, schema } => {
            Ok(Box::new(ValuesExecutor::new(rows.clone(), schema.clone())))
        }
        PlanNode::SeqScan {
            table_oid,
            filter,
            schema,
        } => Ok(Box::new(SeqScanExecutor::new(
            Arc::clone(ctx),
            *table_oid,
            filter.clone(),
            schema.clone(),
        ))),
        PlanNode::IndexScan {
            table_oid,
            index_oid,
            pred_key,
            schema,
        } => Ok(Box::new(IndexScanExecutor::new(
            Arc::clone(ctx),
            *table_oid,
            *index_oid,
            pred_key.clone(),
            schema.clone(),
        ))),
        PlanNode::NestedLoopJoin {
            left,
            right,
            predicate,
            join_type,
            schema,
        } => {
            let left = create_executor(ctx, left)?;
            let right = create_executor(ctx, right)?;
            Ok(Box::new(NestedLoopJoinExecutor::new(
                left,
                right,
                Arc::clone(predicate),
                *join_type,
                schema.clone(),
            )?))
        }
        PlanNode::HashJoin {
            left,
            right,
            left_key_expressions,
            right_key_expressions,
            join_type,
            schema,
        } => {
            let left = create_executor(ctx, left)?;
            let right = create_executor(ctx, right)?;
            Ok(Box::new(HashJoinExecutor::new(
                left,
                right,
                left_key_expressions.clone(),
                right_key_expressions.clone(),
                *join_type,
                schema.clone(),
            )?))
        }
        PlanNode::Aggregation {
            child,
            group_bys,
            aggregates,
            schema,
        } => {
            let child = create_executor(ctx, child)?;
            Ok(Box::new(AggregationExecutor::new(
                child,
                group_bys.clone(),
                aggregates.clone(),
                schema.clone(),
            )))
        }
        PlanNode::Sort {
            child,
            order_bys,
            schema,
        } => {
            let child = create_executor(ctx, child)?;
            Ok(Box::new(SortExecutor::new(
                child,
                order_bys.clone(),
                schema.clone(),
            )))
        }
        PlanNode::Limit {
            child,
            limit,
            schema,
        } => {
            let child = create_executor(ctx, child)?;
            Ok(Box::new(LimitExecutor::new(child, *limit, schema.clone())))
        }
        PlanNode::TopN {
            child,
            order_bys,
            n,
            schema,
        } => {
            let child = create_executor(ctx, child)?;
            Ok(Box::new(TopNExecutor::new(
                child,
                order_bys.clone(),
                *n,
                schema.clone(),
            )))
        }
        PlanNode::Insert {
            child,
            table_oid,
            schema,
        } => {
            let child = create_executor(ctx, child)?;
            Ok(Box::new(InsertExecutor::new(
                Arc::clone(ctx),
                child,
                *table_oid,
                schema.clone(),
            )))
        }
        PlanNode::Update {
            child,
            table_oid,
            target_expressions,
            schema,
        } => {
            let child = create_executor(ctx, child)?;
            Ok(Box::new(UpdateExecutor::new(
                Arc::clone(ctx),
                child,
                *table_oid,
                target_expressions.clone(),
                schema.clone(),
            )))
        }
        PlanNode::Delete {
            child,
            table_oid,
            schema,
        } => {
            let child = create_executor(ctx, child)?;
            Ok(Box::new(DeleteExecutor::new(
                Arc::clone(ctx),
                child,
                *table_oid,
                schema.clone(),
            )))
        }
    }
}

/// Run a plan to completion and collect its output tuples.
pub fn execute_plan(ctx: &Arc<ExecutorContext>, plan: &PlanNode) -> Result<Vec<Tuple>> {
    let mut executor = create_executor(ctx, plan)?;
    executor.init()?;
    let mut out = Vec::new();
    while let Some((tuple, _rid)) = executor.next()? {
        out.push(tuple);
    }
    Ok(out)
}
