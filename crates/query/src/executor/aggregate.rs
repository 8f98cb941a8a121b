//! Aggregate executor.
//!
//! Rows are bucketed by a composite group key built from the GROUP BY cells.
//! Groups keep the order in which their key first appeared. Each output row
//! holds the group's GROUP BY cells followed by one cell per aggregate, and
//! the output schema registers every aggregate under its label and its
//! display name so HAVING and ORDER BY can reference either.

use crate::ast::AggregateFunc;
use crate::executor::eval::{ExpressionEvaluator, DEFAULT_DECIMAL_SCALE};
use crate::executor::Relation;
use crate::planner::{AggregateArg, AggregateSpec, QueryPlan};
use cellsql_core::schema::ColumnInfo;
use cellsql_core::{compare_text, parse_number, round_to_scale, Cell, ColumnType, Decimal, Error, Result, Row};
use core::cmp::Ordering;
use hashbrown::{HashMap, HashSet};
use tracing::debug;

/// Separates the cells of a composite group key.
const KEY_SEPARATOR: char = '\u{1f}';
/// Stands for a Null cell inside a group key.
const NULL_MARKER: &str = "\u{0}";

/// Aggregate executor - groups rows and computes aggregate functions.
pub struct AggregateExecutor<'a> {
    plan: &'a QueryPlan,
    scale: u32,
}

impl<'a> AggregateExecutor<'a> {
    /// Creates an aggregate executor for the plan's GROUP BY, aggregate list
    /// and HAVING.
    pub fn new(plan: &'a QueryPlan) -> Self {
        Self {
            plan,
            scale: DEFAULT_DECIMAL_SCALE,
        }
    }

    /// Sets the scale AVG and HAVING division round to.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Executes the aggregation. Non-aggregate plans pass through unchanged.
    ///
    /// Fails with [`Error::ColumnResolution`] if a GROUP BY column or an
    /// aggregate argument is not in the input schema.
    pub fn execute(&self, input: Relation) -> Result<Relation> {
        if !self.plan.is_aggregate() {
            return Ok(input);
        }

        let group_cols = self.resolve_group_by(&input)?;
        let agg_cols = self.resolve_arguments(&input)?;

        // Global aggregation over zero rows still yields one group.
        let groups: Vec<Vec<&Row>> = if group_cols.is_empty() {
            vec![input.rows().iter().collect()]
        } else {
            group_rows(input.rows(), &group_cols)
        };
        let group_count = groups.len();

        let rows: Vec<Row> = groups
            .iter()
            .map(|members| {
                let mut cells: Vec<Cell> = Vec::with_capacity(group_cols.len() + agg_cols.len());
                if let Some(first) = members.first() {
                    cells.extend(group_cols.iter().map(|&i| first.get(i).map(str::to_string)));
                }
                for (spec, col) in self.plan.aggregates.iter().zip(&agg_cols) {
                    cells.push(self.compute(spec, *col, members));
                }
                Row::new(cells)
            })
            .collect();

        let columns = self.output_columns(&input, &group_cols, &agg_cols);
        let output = Relation::new(rows, columns, input.tables().to_vec());

        let output = match &self.plan.having {
            Some(having) => output.retain(|index, row| {
                ExpressionEvaluator::new(index)
                    .with_scale(self.scale)
                    .matches(having, row)
            }),
            None => output,
        };

        debug!(
            input_rows = input.len(),
            groups = group_count,
            output_rows = output.len(),
            "aggregate"
        );
        Ok(output)
    }

    fn resolve_group_by(&self, input: &Relation) -> Result<Vec<usize>> {
        self.plan
            .group_by
            .iter()
            .map(|col| {
                input
                    .index()
                    .resolve_strict(col.table.as_deref(), &col.column)
                    .ok_or_else(|| {
                        Error::column_resolution(format!("GROUP BY column {} not found", col))
                    })
            })
            .collect()
    }

    /// Offsets of each aggregate's argument column; `None` for `*`.
    fn resolve_arguments(&self, input: &Relation) -> Result<Vec<Option<usize>>> {
        self.plan
            .aggregates
            .iter()
            .map(|spec| match &spec.arg {
                AggregateArg::Star => Ok(None),
                AggregateArg::Column(col) => input
                    .index()
                    .resolve_strict(col.table.as_deref(), &col.column)
                    .map(Some)
                    .ok_or_else(|| {
                        Error::column_resolution(format!(
                            "column {} in {} not found",
                            col,
                            spec.display_name()
                        ))
                    }),
            })
            .collect()
    }

    fn output_columns(
        &self,
        input: &Relation,
        group_cols: &[usize],
        agg_cols: &[Option<usize>],
    ) -> Vec<ColumnInfo> {
        let mut columns: Vec<ColumnInfo> = group_cols
            .iter()
            .map(|&i| input.columns()[i].clone())
            .collect();
        for (spec, col) in self.plan.aggregates.iter().zip(agg_cols) {
            let column_type = match (spec.func, col) {
                (AggregateFunc::Max | AggregateFunc::Min, Some(i)) => input.columns()[*i].column_type,
                _ => ColumnType::Numeric,
            };
            columns.push(ColumnInfo::new(spec.label(), column_type).with_alias(spec.display_name()));
        }
        columns
    }

    fn compute(&self, spec: &AggregateSpec, col: Option<usize>, rows: &[&Row]) -> Cell {
        let idx = match col {
            Some(idx) => idx,
            // COUNT(*) is the only aggregate the compiler lets through on `*`
            None => return Some(rows.len().to_string()),
        };
        let values = non_null_cells(rows, idx, spec.distinct);

        match spec.func {
            AggregateFunc::Count => Some(values.len().to_string()),
            AggregateFunc::Sum => sum(&values).map(|s| s.to_string()),
            AggregateFunc::Avg => {
                if values.is_empty() {
                    return None;
                }
                let total = sum(&values)?;
                total
                    .checked_div(Decimal::from(values.len() as u64))
                    .map(|avg| round_to_scale(avg, self.scale).to_string())
            }
            AggregateFunc::Max => extreme(&values, Ordering::Greater),
            AggregateFunc::Min => extreme(&values, Ordering::Less),
        }
    }
}

/// Buckets rows by group key, preserving first-occurrence order.
fn group_rows<'r>(rows: &'r [Row], group_cols: &[usize]) -> Vec<Vec<&'r Row>> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Row>> = Vec::new();
    for row in rows {
        let key = group_key(row, group_cols);
        let pos = *positions.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[pos].push(row);
    }
    groups
}

fn group_key(row: &Row, group_cols: &[usize]) -> String {
    let mut key = String::new();
    for (n, &i) in group_cols.iter().enumerate() {
        if n > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(row.get(i).unwrap_or(NULL_MARKER));
    }
    key
}

/// Non-null cells of one column, deduplicated by raw text if `distinct`.
fn non_null_cells<'r>(rows: &[&'r Row], idx: usize, distinct: bool) -> Vec<&'r str> {
    let cells = rows.iter().filter_map(|r| r.get(idx));
    if distinct {
        let mut seen = HashSet::new();
        cells.filter(|c| seen.insert(*c)).collect()
    } else {
        cells.collect()
    }
}

/// The first cell that no later cell beats in direction `wins`; ties keep
/// the earlier cell's text.
fn extreme(values: &[&str], wins: Ordering) -> Cell {
    values
        .iter()
        .copied()
        .reduce(|kept, next| if compare_text(next, kept) == wins { next } else { kept })
        .map(str::to_string)
}

/// Sum of the numeric cells; non-numeric cells are skipped. Overflow yields
/// `None`.
fn sum(values: &[&str]) -> Option<Decimal> {
    values
        .iter()
        .filter_map(|v| parse_number(v))
        .try_fold(Decimal::ZERO, |acc, n| acc.checked_add(n))
}
