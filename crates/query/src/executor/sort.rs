//! Sort executor.

use crate::ast::SortOrder;
use crate::executor::eval::{ExpressionEvaluator, DEFAULT_DECIMAL_SCALE};
use crate::executor::Relation;
use crate::planner::OrderByItem;
use cellsql_core::{compare_sort_keys, Row, Value};
use core::cmp::Ordering;

/// Sort executor - stable sort by a sequence of ORDER BY keys.
///
/// Keys compare numerically when both sides parse as numbers and lexically
/// otherwise; Null sorts first in ascending order.
pub struct SortExecutor<'a> {
    order_by: &'a [OrderByItem],
    scale: u32,
}

impl<'a> SortExecutor<'a> {
    /// Creates a new sort executor.
    pub fn new(order_by: &'a [OrderByItem]) -> Self {
        Self {
            order_by,
            scale: DEFAULT_DECIMAL_SCALE,
        }
    }

    /// Sets the scale for division inside sort keys.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Executes the sort on the input relation.
    pub fn execute(&self, input: Relation) -> Relation {
        if self.order_by.is_empty() {
            return input;
        }
        let evaluator = ExpressionEvaluator::new(input.index()).with_scale(self.scale);
        let mut keyed: Vec<(Vec<Value>, usize)> = input
            .rows()
            .iter()
            .enumerate()
            .map(|(pos, row)| {
                let keys = self
                    .order_by
                    .iter()
                    .map(|item| evaluator.evaluate(&item.expr, row))
                    .collect();
                (keys, pos)
            })
            .collect();

        // slice::sort_by is stable
        keyed.sort_by(|(a, _), (b, _)| self.compare_keys(a, b));

        input.map_rows(|rows| {
            let mut slots: Vec<Option<Row>> = rows.into_iter().map(Some).collect();
            keyed
                .iter()
                .filter_map(|(_, pos)| slots[*pos].take())
                .collect()
        })
    }

    fn compare_keys(&self, a: &[Value], b: &[Value]) -> Ordering {
        for ((av, bv), item) in a.iter().zip(b).zip(self.order_by) {
            let cmp = compare_sort_keys(av, bv);
            if cmp != Ordering::Equal {
                return match item.order {
                    SortOrder::Asc => cmp,
                    SortOrder::Desc => cmp.reverse(),
                };
            }
        }
        Ordering::Equal
    }
}
