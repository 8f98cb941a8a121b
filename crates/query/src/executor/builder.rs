//! Result assembly: projection, ordering and pagination.

use crate::executor::eval::DEFAULT_DECIMAL_SCALE;
use crate::executor::{LimitExecutor, ProjectExecutor, Relation, SortExecutor};
use crate::planner::QueryPlan;
use cellsql_core::{ColumnType, QueryResult, Row};
use tracing::debug;

/// Turns the filtered, aggregated relation into a [`QueryResult`].
pub struct ResultBuilder<'a> {
    plan: &'a QueryPlan,
    scale: u32,
}

impl<'a> ResultBuilder<'a> {
    pub fn new(plan: &'a QueryPlan) -> Self {
        Self {
            plan,
            scale: DEFAULT_DECIMAL_SCALE,
        }
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Projects, sorts, then applies OFFSET and LIMIT.
    pub fn build(&self, input: Relation) -> QueryResult {
        let projection = ProjectExecutor::new(self.plan)
            .with_scale(self.scale)
            .execute(input);
        let width = projection.output_width;

        let sorted = SortExecutor::new(&self.plan.order_by)
            .with_scale(self.scale)
            .execute(projection.relation);

        let limit = self.plan.limit.map(to_usize);
        let offset = self.plan.offset.map(to_usize).unwrap_or(0);
        let paged = LimitExecutor::new(limit, offset).execute(sorted);

        let (names, types): (Vec<String>, Vec<ColumnType>) = paged.columns()[..width]
            .iter()
            .map(|c| (c.name.clone(), c.column_type))
            .unzip();
        let rows: Vec<Row> = paged
            .into_rows()
            .into_iter()
            .map(|row| {
                let mut cells = row.into_values();
                cells.truncate(width);
                Row::new(cells)
            })
            .collect();

        debug!(rows = rows.len(), columns = width, "result built");
        QueryResult::from_rows(names, types, rows)
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}
