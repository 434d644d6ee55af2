//! Query execution - the pull-based iterator model.
//!
//! A plan tree ([`PlanNode`]) is turned into a tree of [`Executor`]s by
//! [`create_executor`]; the driver pulls tuples from the root. Everything
//! an executor needs beyond its children travels in the shared
//! [`ExecutorContext`].

mod context;
pub mod executor;
pub mod executors;
pub mod expression;
pub mod plan;

pub use context::{ExecutorContext, Transaction};
pub use executor::{create_executor, execute_plan, Executor};
pub use plan::{AggregationType, JoinType, OrderBy, OrderByType, PlanNode};
