//! Hash Join implementation.
//!
//! Every join step is an equi-join of the accumulated left relation with one
//! loaded table. The build side is hashed on its key cell; Null keys are left
//! out of the hash table, so they never match and only surface as unmatched
//! rows of outer joins. Output rows are always `left ++ right`, whichever
//! side was built, so column offsets accumulate left to right.

use crate::ast::{ColumnRef, JoinType};
use crate::executor::Relation;
use crate::planner::JoinSpec;
use cellsql_core::schema::Table;
use cellsql_core::{Error, Result, Row};
use hashbrown::HashMap;
use tracing::debug;

/// Hash join of a relation with a table, following one [`JoinSpec`].
pub struct HashJoin<'a> {
    spec: &'a JoinSpec,
}

impl<'a> HashJoin<'a> {
    /// Creates a hash join executor.
    pub fn new(spec: &'a JoinSpec) -> Self {
        Self { spec }
    }

    /// Executes the join.
    ///
    /// Fails with [`Error::JoinColumnNotFound`] if a key column cannot be
    /// resolved on its side.
    pub fn execute(&self, left: Relation, right: &Table) -> Result<Relation> {
        let (left_key, right_key) = self.resolve_keys(&left, right)?;

        let right_rows: Vec<Row> = right.rows().collect();
        let left_width = left.width();
        let right_width = right.column_count();

        let rows = match self.spec.join_type {
            JoinType::Inner | JoinType::LeftOuter | JoinType::FullOuter => probe_right(
                &left,
                &right_rows,
                (left_key, right_key),
                self.spec.join_type,
                left_width,
                right_width,
            ),
            JoinType::RightOuter => probe_left(&left, &right_rows, left_key, right_key, left_width),
        };

        debug!(
            table = %right.id(),
            join_type = ?self.spec.join_type,
            left_rows = left.len(),
            right_rows = right_rows.len(),
            output_rows = rows.len(),
            "hash join"
        );

        let mut columns = left.columns().to_vec();
        columns.extend(right.column_infos());
        let mut tables = left.tables().to_vec();
        tables.push(right.id().to_string());
        Ok(Relation::new(rows, columns, tables))
    }

    /// Resolves (left offset, right column index). Unqualified keys written
    /// in reverse order are accepted.
    fn resolve_keys(&self, left: &Relation, right: &Table) -> Result<(usize, usize)> {
        let spec = self.spec;
        if let Some(keys) = resolve_pair(left, right, &spec.left, &spec.right) {
            return Ok(keys);
        }
        if let Some(keys) = resolve_pair(left, right, &spec.right, &spec.left) {
            return Ok(keys);
        }
        if left_offset(left, &spec.left).is_none() {
            return Err(Error::join_column_not_found(
                spec.left.to_string(),
                "left",
                right.id().to_string(),
            ));
        }
        Err(Error::join_column_not_found(
            spec.right.to_string(),
            "right",
            right.id().to_string(),
        ))
    }
}

fn resolve_pair(
    left: &Relation,
    right: &Table,
    left_col: &ColumnRef,
    right_col: &ColumnRef,
) -> Option<(usize, usize)> {
    Some((left_offset(left, left_col)?, right_index(right, right_col)?))
}

fn left_offset(left: &Relation, col: &ColumnRef) -> Option<usize> {
    left.index().resolve_strict(col.table.as_deref(), &col.column)
}

fn right_index(right: &Table, col: &ColumnRef) -> Option<usize> {
    match col.table.as_deref() {
        Some(q) if !right.is_qualified_by(q) => None,
        _ => right.column_index(&col.column),
    }
}

/// Builds over the right table and probes with every left row (INNER, LEFT,
/// FULL OUTER).
fn probe_right(
    left: &Relation,
    right_rows: &[Row],
    (left_key, right_key): (usize, usize),
    join_type: JoinType,
    left_width: usize,
    right_width: usize,
) -> Vec<Row> {
    let hash_table = build(right_rows, right_key);
    let mut matched_right = vec![false; right_rows.len()];
    let mut out = Vec::with_capacity(left.len());

    for left_row in left.rows() {
        let matches = left_row.get(left_key).and_then(|k| hash_table.get(k));
        match matches {
            Some(indices) => {
                for &i in indices {
                    matched_right[i] = true;
                    out.push(Row::concat(left_row, &right_rows[i]));
                }
            }
            None if join_type != JoinType::Inner => out.push(left_row.pad_right(right_width)),
            None => {}
        }
    }

    if join_type == JoinType::FullOuter {
        for (row, matched) in right_rows.iter().zip(&matched_right) {
            if !matched {
                out.push(row.pad_left(left_width));
            }
        }
    }
    out
}

/// Builds over the left relation and probes with every right row (RIGHT
/// OUTER).
fn probe_left(
    left: &Relation,
    right_rows: &[Row],
    left_key: usize,
    right_key: usize,
    left_width: usize,
) -> Vec<Row> {
    let hash_table = build(left.rows(), left_key);
    let mut out = Vec::with_capacity(right_rows.len());

    for right_row in right_rows {
        match right_row.get(right_key).and_then(|k| hash_table.get(k)) {
            Some(indices) => {
                for &i in indices {
                    out.push(Row::concat(&left.rows()[i], right_row));
                }
            }
            None => out.push(right_row.pad_left(left_width)),
        }
    }
    out
}

/// Maps key text to the positions of the rows holding it, skipping Null keys.
fn build(rows: &[Row], key: usize) -> HashMap<&str, Vec<usize>> {
    let mut hash_table: HashMap<&str, Vec<usize>> = HashMap::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        if let Some(k) = row.get(key) {
            hash_table.entry(k).or_default().push(idx);
        }
    }
    hash_table
}
