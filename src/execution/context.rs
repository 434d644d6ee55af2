//! Executor context - what every executor can reach.

use std::sync::Arc;

use crate::catalog::Catalog;

/// Opaque transaction handle, threaded through executor and index calls.
///
/// Carries no behavior here; it exists so the call shapes stay stable when
/// a transaction layer appears above this crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Transaction;

/// Shared state handed to every executor in a query.
pub struct ExecutorContext {
    catalog: Arc<Catalog>,
    txn: Transaction,
}

impl ExecutorContext {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            txn: Transaction,
        }
    }

    #[inline]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    #[inline]
    pub fn txn(&self) -> &Transaction {
        &self.txn
    }
}
