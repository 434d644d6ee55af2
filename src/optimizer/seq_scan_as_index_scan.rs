//! Rewrite: a sequential scan filtered on `column = constant` becomes an
//! index scan when a matching single-column index exists.

use crate::execution::expression::{ComparisonType, Expression};
use crate::execution::plan::PlanNode;
use crate::optimizer::Optimizer;
use crate::types::Value;

/// Pull `(col_idx, constant)` out of a `column = constant` filter, in
/// either operand order. Anything else disqualifies.
fn extract_column_equals_constant(expr: &Expression) -> Option<(usize, Value)> {
    let Expression::Comparison {
        comp_type: ComparisonType::Equal,
        left,
        right,
    } = expr
    else {
        return None;
    };
    match (left.as_ref(), right.as_ref()) {
        (Expression::ColumnRef { col_idx, .. }, Expression::Constant(value))
        | (Expression::Constant(value), Expression::ColumnRef { col_idx, .. }) => {
            Some((*col_idx, value.clone()))
        }
        _ => None,
    }
}

impl Optimizer {
    /// Bottom-up pass probing the catalog for a usable equality index.
    pub(crate) fn rewrite_seq_scan_as_index_scan(&self, plan: PlanNode) -> PlanNode {
        let plan = plan.map_children(&mut |child| self.rewrite_seq_scan_as_index_scan(child));

        if let PlanNode::SeqScan {
            table_oid,
            filter: Some(filter),
            schema,
        } = plan
        {
            if let Some((col_idx, pred_key)) = extract_column_equals_constant(&filter) {
                if let Ok(table) = self.catalog().get_table(table_oid) {
                    for index_info in self.catalog().get_table_indexes(&table.name) {
                        if index_info.key_attrs() == &[col_idx][..] {
                            return PlanNode::IndexScan {
                                table_oid,
                                index_oid: index_info.index_oid,
                                pred_key,
                                schema,
                            };
                        }
                    }
                }
            }
            return PlanNode::SeqScan {
                table_oid,
                filter: Some(filter),
                schema,
            };
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferPoolManager;
    use crate::catalog::{Catalog, Schema};
    use crate::index::HashIndex;
    use crate::storage::DiskManager;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn setup() -> (Optimizer, u32, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        let bpm = Arc::new(BufferPoolManager::new(64, 2, dm));

        let catalog = Arc::new(Catalog::new());
        let table = catalog.create_table("t", Schema::from_names(&["a", "b"]));
        catalog
            .create_index("t_b", "t", vec![1], HashIndex::new(bpm).unwrap())
            .unwrap();
        (Optimizer::new(catalog), table.oid, dir)
    }

    fn filtered_scan(table_oid: u32, col_idx: usize) -> PlanNode {
        PlanNode::SeqScan {
            table_oid,
            filter: Some(Expression::equal(
                Expression::column(col_idx),
                Expression::constant(Value::Integer(7)),
            )),
            schema: Schema::from_names(&["a", "b"]),
        }
    }

    #[test]
    fn test_indexed_column_rewrites() {
        let (optimizer, oid, _dir) = setup();
        let rewritten = optimizer.rewrite_seq_scan_as_index_scan(filtered_scan(oid, 1));
        let PlanNode::IndexScan { pred_key, .. } = rewritten else {
            panic!("expected index scan");
        };
        assert_eq!(pred_key, Value::Integer(7));
    }

    #[test]
    fn test_unindexed_column_stays_seq_scan() {
        let (optimizer, oid, _dir) = setup();
        let rewritten = optimizer.rewrite_seq_scan_as_index_scan(filtered_scan(oid, 0));
        assert!(matches!(rewritten, PlanNode::SeqScan { .. }));
    }

    #[test]
    fn test_non_equality_filter_stays_seq_scan() {
        let (optimizer, oid, _dir) = setup();
        let plan = PlanNode::SeqScan {
            table_oid: oid,
            filter: Some(Expression::comparison(
                ComparisonType::LessThan,
                Expression::column(1),
                Expression::constant(Value::Integer(7)),
            )),
            schema: Schema::from_names(&["a", "b"]),
        };
        let rewritten = optimizer.rewrite_seq_scan_as_index_scan(plan);
        assert!(matches!(rewritten, PlanNode::SeqScan { .. }));
    }

    #[test]
    fn test_unfiltered_scan_untouched() {
        let (optimizer, oid, _dir) = setup();
        let plan = PlanNode::SeqScan {
            table_oid: oid,
            filter: None,
            schema: Schema::from_names(&["a", "b"]),
        };
        let rewritten = optimizer.rewrite_seq_scan_as_index_scan(plan);
        assert!(matches!(rewritten, PlanNode::SeqScan { filter: None, .. }));
    }
}
