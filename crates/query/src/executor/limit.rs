//! Limit executor.

use crate::executor::Relation;

/// Limit executor - applies OFFSET then LIMIT to a relation.
pub struct LimitExecutor {
    limit: Option<usize>,
    offset: usize,
}

impl LimitExecutor {
    /// Creates a new limit executor. `None` means no limit; `Some(0)` keeps
    /// no rows.
    pub fn new(limit: Option<usize>, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Executes the limit on the input relation.
    pub fn execute(&self, input: Relation) -> Relation {
        let (limit, offset) = (self.limit, self.offset);
        input.map_rows(|mut rows| {
            let len = rows.len();
            let start = offset.min(len);
            let end = match limit {
                Some(limit) => offset.saturating_add(limit).min(len),
                None => len,
            };
            rows.truncate(end);
            if start > 0 {
                rows.drain(..start);
            }
            rows
        })
    }
}
