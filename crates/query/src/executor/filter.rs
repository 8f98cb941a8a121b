//! Filter executor.

use crate::ast::Expr;
use crate::executor::eval::{ExpressionEvaluator, DEFAULT_DECIMAL_SCALE};
use crate::executor::Relation;
use tracing::debug;

/// Filter executor - keeps the rows for which a predicate is true.
///
/// Null and false both drop the row.
pub struct FilterExecutor<'a> {
    predicate: &'a Expr,
    scale: u32,
}

impl<'a> FilterExecutor<'a> {
    /// Creates a new filter executor.
    pub fn new(predicate: &'a Expr) -> Self {
        Self {
            predicate,
            scale: DEFAULT_DECIMAL_SCALE,
        }
    }

    /// Sets the scale used for division inside the predicate.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Executes the filter on the input relation.
    pub fn execute(&self, input: Relation) -> Relation {
        let before = input.len();
        let output = input.retain(|index, row| {
            ExpressionEvaluator::new(index)
                .with_scale(self.scale)
                .matches(self.predicate, row)
        });
        debug!(input_rows = before, output_rows = output.len(), "filter");
        output
    }
}
