//! Project executor.
//!
//! Produces the output columns of a statement: plain SELECT items in order,
//! then the visible aggregates. Each output row is followed by the cells of
//! the row it was projected from, so ORDER BY can still reach source columns
//! that were not selected. [`Projection::output_width`] tells how many
//! leading cells belong to the result.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::executor::eval::{ExpressionEvaluator, DEFAULT_DECIMAL_SCALE};
use crate::executor::Relation;
use crate::planner::{ProjectionItem, QueryPlan};
use cellsql_core::schema::ColumnInfo;
use cellsql_core::{Cell, ColumnType, Row, Value};

/// Where an output column takes its cells from.
enum Source<'a> {
    /// A column of the input relation.
    Offset(usize),
    /// A computed expression.
    Computed(&'a Expr),
    /// An unresolved plain column.
    Null,
}

/// A projected relation and the number of result columns at its front.
pub struct Projection {
    pub relation: Relation,
    pub output_width: usize,
}

/// Project executor - evaluates the SELECT list.
pub struct ProjectExecutor<'a> {
    plan: &'a QueryPlan,
    scale: u32,
}

impl<'a> ProjectExecutor<'a> {
    /// Creates a new project executor.
    pub fn new(plan: &'a QueryPlan) -> Self {
        Self {
            plan,
            scale: DEFAULT_DECIMAL_SCALE,
        }
    }

    /// Sets the scale for division in computed columns.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Executes the projection on the input relation.
    pub fn execute(&self, input: Relation) -> Projection {
        let (columns, sources) = self.output_columns(&input);
        let output_width = columns.len();

        let evaluator = ExpressionEvaluator::new(input.index()).with_scale(self.scale);
        let rows: Vec<Row> = input
            .rows()
            .iter()
            .map(|row| {
                let mut cells: Vec<Cell> = Vec::with_capacity(output_width + row.len());
                for source in &sources {
                    cells.push(match source {
                        Source::Offset(i) => row.get(*i).map(str::to_string),
                        Source::Computed(expr) => evaluator.evaluate(expr, row).into_cell(),
                        Source::Null => None,
                    });
                }
                cells.extend(row.values().iter().cloned());
                Row::new(cells)
            })
            .collect();

        let mut all_columns = columns;
        all_columns.extend(input.columns().iter().cloned());
        Projection {
            relation: Relation::new(rows, all_columns, input.tables().to_vec()),
            output_width,
        }
    }

    fn output_columns<'p>(&'p self, input: &Relation) -> (Vec<ColumnInfo>, Vec<Source<'p>>) {
        let mut columns = Vec::new();
        let mut sources = Vec::new();

        for item in &self.plan.projection {
            match item {
                ProjectionItem::Wildcard { qualifier } => {
                    let offsets: Vec<usize> = match qualifier {
                        Some(q) => input.columns_qualified_by(q),
                        None => (0..input.width()).collect(),
                    };
                    for i in offsets {
                        let col = &input.columns()[i];
                        columns.push(ColumnInfo::new(col.name.clone(), col.column_type));
                        sources.push(Source::Offset(i));
                    }
                }
                ProjectionItem::Expr { expr, alias, text } => {
                    if let Some(col) = expr.as_column() {
                        match input.index().resolve(col.table.as_deref(), &col.column) {
                            Some(i) => {
                                let info = &input.columns()[i];
                                let name = alias.clone().unwrap_or_else(|| info.name.clone());
                                columns.push(ColumnInfo::new(name, info.column_type));
                                sources.push(Source::Offset(i));
                            }
                            None => {
                                let name = alias.clone().unwrap_or_else(|| col.column.clone());
                                columns.push(ColumnInfo::new(name, ColumnType::Text));
                                sources.push(Source::Null);
                            }
                        }
                    } else {
                        let name = alias.clone().unwrap_or_else(|| text.clone());
                        columns.push(ColumnInfo::new(name, infer_type(expr, input)));
                        sources.push(Source::Computed(expr));
                    }
                }
            }
        }

        // Aggregates sit at the end of an aggregated relation, in plan order.
        let first_aggregate = input.width().saturating_sub(self.plan.aggregates.len());
        for (n, spec) in self.plan.aggregates.iter().enumerate() {
            if !spec.visible {
                continue;
            }
            let i = first_aggregate + n;
            let column_type = input
                .columns()
                .get(i)
                .map(|c| c.column_type)
                .unwrap_or(ColumnType::Numeric);
            columns.push(ColumnInfo::new(spec.label(), column_type));
            sources.push(Source::Offset(i));
        }

        (columns, sources)
    }
}

/// Infers the type hint of a computed column.
fn infer_type(expr: &Expr, input: &Relation) -> ColumnType {
    match expr {
        Expr::Column(col) => input
            .index()
            .resolve(col.table.as_deref(), &col.column)
            .map(|i| input.columns()[i].column_type)
            .unwrap_or_default(),
        Expr::Literal(Value::Number(_)) => ColumnType::Numeric,
        Expr::Literal(Value::Boolean(_)) => ColumnType::Boolean,
        Expr::Literal(_) => ColumnType::Text,
        Expr::BinaryOp { op, .. } if op.is_arithmetic() => ColumnType::Numeric,
        Expr::BinaryOp {
            op: BinaryOp::Concat,
            ..
        } => ColumnType::Text,
        Expr::BinaryOp { .. } => ColumnType::Boolean,
        Expr::UnaryOp {
            op: UnaryOp::Neg, ..
        } => ColumnType::Numeric,
        Expr::UnaryOp {
            op: UnaryOp::Not, ..
        } => ColumnType::Boolean,
        Expr::Function { name, args } => match name.as_str() {
            "LENGTH" | "CHAR_LENGTH" | "CHARACTER_LENGTH" => ColumnType::Numeric,
            "UPPER" | "UCASE" | "LOWER" | "LCASE" | "TRIM" => ColumnType::Text,
            _ => args
                .first()
                .map(|a| infer_type(a, input))
                .unwrap_or_default(),
        },
        Expr::Between { .. } | Expr::In { .. } | Expr::Like { .. } | Expr::IsNull { .. } => {
            ColumnType::Boolean
        }
    }
}
