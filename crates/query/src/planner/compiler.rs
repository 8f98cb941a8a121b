//! Query compiler: parsed SELECT AST to [`QueryPlan`].
//!
//! The compiler classifies SELECT items into plain columns and aggregate
//! calls, reduces each JOIN ... ON to one equi-join pair, keeps WHERE and
//! HAVING as expression trees, and rejects everything outside the supported
//! subset before any table is read.

use crate::ast::{AggregateFunc, BinaryOp, ColumnRef, Expr, JoinType, SortOrder, UnaryOp};
use crate::parser::parse_query;
use crate::planner::{
    AggregateArg, AggregateSpec, JoinSpec, OrderByItem, ProjectionItem, QueryPlan, TableRef,
};
use cellsql_core::schema::TableId;
use cellsql_core::{parse_number, EngineConfig, Error, Result, Value};
use sqlparser::ast as sql;
use sqlparser::ast::{
    BinaryOperator, DuplicateTreatment, FunctionArg, FunctionArgExpr, FunctionArguments,
    GroupByExpr, JoinConstraint, JoinOperator, LimitClause, OrderByKind, SelectItem,
    SelectItemQualifiedWildcardKind, SetExpr, TableFactor, UnaryOperator,
};

/// Whether aggregate calls may appear in the expression being converted.
#[derive(Clone, Copy)]
enum AggregateMode {
    /// Aggregates are rejected; the string names the clause.
    Forbidden(&'static str),
    /// Aggregates become references to computed aggregate columns.
    Reference,
}

/// Compiles parsed statements into query plans.
pub struct QueryCompiler<'a> {
    config: &'a EngineConfig,
}

impl<'a> QueryCompiler<'a> {
    /// Creates a compiler using `config` for table name defaults.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Parses and compiles statement text.
    pub fn compile_sql(&self, sql: &str) -> Result<QueryPlan> {
        let query = parse_query(sql)?;
        self.compile(&query)
    }

    /// Compiles a parsed query.
    pub fn compile(&self, query: &sql::Query) -> Result<QueryPlan> {
        if query.with.is_some() {
            return Err(Error::unsupported("WITH clauses"));
        }
        if query.fetch.is_some() {
            return Err(Error::unsupported("FETCH clauses; use LIMIT"));
        }
        let select = match query.body.as_ref() {
            SetExpr::Select(select) => select,
            SetExpr::SetOperation { .. } => {
                return Err(Error::unsupported("UNION, INTERSECT and EXCEPT"))
            }
            SetExpr::Query(_) => return Err(Error::unsupported("subqueries")),
            other => return Err(Error::unsupported(format!("query body: {}", other))),
        };

        let mut state = Compilation {
            config: self.config,
            aggregates: Vec::new(),
        };
        state.compile_select(select, query)
    }
}

/// Per-statement compilation state.
struct Compilation<'a> {
    config: &'a EngineConfig,
    aggregates: Vec<AggregateSpec>,
}

impl Compilation<'_> {
    fn compile_select(&mut self, select: &sql::Select, query: &sql::Query) -> Result<QueryPlan> {
        if select.distinct.is_some() {
            return Err(Error::unsupported("SELECT DISTINCT"));
        }
        if select.top.is_some() {
            return Err(Error::unsupported("TOP; use LIMIT"));
        }
        if select.into.is_some() {
            return Err(Error::unsupported("SELECT INTO"));
        }

        let projection = self.projection(&select.projection)?;

        let from = match select.from.as_slice() {
            [] => return Err(Error::unsupported("SELECT without FROM")),
            [from] => from,
            _ => {
                return Err(Error::unsupported(
                    "comma-separated FROM lists; use JOIN ... ON",
                ))
            }
        };
        let source = self.table_ref(&from.relation)?;
        let mut joins: Vec<JoinSpec> = Vec::with_capacity(from.joins.len());
        for join in &from.joins {
            joins.push(self.join_spec(join)?);
        }

        let filter = select
            .selection
            .as_ref()
            .map(|e| self.convert(e, AggregateMode::Forbidden("WHERE")))
            .transpose()?;

        let group_by = self.group_by(&select.group_by)?;

        let having = select
            .having
            .as_ref()
            .map(|e| self.convert(e, AggregateMode::Reference))
            .transpose()?;

        let order_by = self.order_by(query.order_by.as_ref())?;
        let (limit, offset) = self.limit_offset(query.limit_clause.as_ref())?;

        let plan = QueryPlan {
            projection,
            aggregates: core::mem::take(&mut self.aggregates),
            source,
            joins,
            filter,
            group_by,
            having,
            order_by,
            limit,
            offset,
        };
        validate_grouping(&plan)?;
        Ok(plan)
    }

    fn projection(&mut self, items: &[SelectItem]) -> Result<Vec<ProjectionItem>> {
        let mut projection = Vec::with_capacity(items.len());
        for item in items {
            match item {
                SelectItem::Wildcard(_) => {
                    projection.push(ProjectionItem::Wildcard { qualifier: None })
                }
                SelectItem::QualifiedWildcard(kind, _) => {
                    let qualifier = match kind {
                        SelectItemQualifiedWildcardKind::ObjectName(name) => {
                            last_ident(name).ok_or_else(|| {
                                Error::unsupported(format!("wildcard qualifier {}", name))
                            })?
                        }
                        SelectItemQualifiedWildcardKind::Expr(e) => {
                            return Err(Error::unsupported(format!("wildcard on {}", e)))
                        }
                    };
                    projection.push(ProjectionItem::Wildcard {
                        qualifier: Some(qualifier),
                    });
                }
                SelectItem::UnnamedExpr(e) => {
                    if let Some(item) = self.select_expr(e, None)? {
                        projection.push(item);
                    }
                }
                SelectItem::ExprWithAlias { expr, alias } => {
                    if let Some(item) = self.select_expr(expr, Some(alias.value.clone()))? {
                        projection.push(item);
                    }
                }
                #[allow(unreachable_patterns)]
                other => return Err(Error::unsupported(format!("select item {}", other))),
            }
        }
        Ok(projection)
    }

    /// Registers a top-level aggregate call, or returns the plain item.
    fn select_expr(
        &mut self,
        expr: &sql::Expr,
        alias: Option<String>,
    ) -> Result<Option<ProjectionItem>> {
        if let sql::Expr::Function(func) = unwrap_nested(expr) {
            if let Some(kind) = aggregate_kind(func) {
                let mut spec = aggregate_spec(kind, func)?;
                spec.alias = alias;
                self.aggregates.push(spec);
                return Ok(None);
            }
        }
        let compiled = self.convert(
            expr,
            AggregateMode::Forbidden("SELECT expressions (only top-level aggregate calls)"),
        )?;
        Ok(Some(ProjectionItem::Expr {
            expr: compiled,
            alias,
            text: expr.to_string(),
        }))
    }

    fn table_ref(&self, factor: &TableFactor) -> Result<TableRef> {
        match factor {
            TableFactor::Table {
                name, alias, args, ..
            } => {
                if args.is_some() {
                    return Err(Error::unsupported(format!("table function {}", name)));
                }
                let parts: Vec<String> = name
                    .0
                    .iter()
                    .filter_map(|part| part.as_ident())
                    .map(|ident| ident.value.clone())
                    .collect();
                let id = TableId::from_parts(&parts, &self.config.default_schema)
                    .ok_or_else(|| Error::unsupported(format!("table name {}", name)))?;
                Ok(TableRef::new(id, alias.as_ref().map(|a| a.name.value.clone())))
            }
            TableFactor::Derived { .. } => Err(Error::unsupported("subqueries in FROM")),
            other => Err(Error::unsupported(format!("table reference {}", other))),
        }
    }

    fn join_spec(&self, join: &sql::Join) -> Result<JoinSpec> {
        let table = self.table_ref(&join.relation)?;
        let (join_type, constraint) = match &join.join_operator {
            JoinOperator::Inner(c) | JoinOperator::Join(c) => (JoinType::Inner, c),
            JoinOperator::LeftOuter(c) | JoinOperator::Left(c) => (JoinType::LeftOuter, c),
            JoinOperator::RightOuter(c) | JoinOperator::Right(c) => (JoinType::RightOuter, c),
            JoinOperator::FullOuter(c) => (JoinType::FullOuter, c),
            JoinOperator::CrossJoin => {
                return Err(Error::unsupported_join(format!(
                    "CROSS JOIN {}; use JOIN ... ON",
                    table.id
                )))
            }
            _ => {
                return Err(Error::unsupported_join(format!(
                    "join with {}; only INNER, LEFT, RIGHT and FULL OUTER joins are supported",
                    table.id
                )))
            }
        };
        let on = match constraint {
            JoinConstraint::On(on) => on,
            JoinConstraint::Using(_) => {
                return Err(Error::unsupported_join(format!(
                    "USING in join with {}; use ON",
                    table.id
                )))
            }
            JoinConstraint::Natural => {
                return Err(Error::unsupported_join(format!(
                    "NATURAL join with {}",
                    table.id
                )))
            }
            JoinConstraint::None => {
                return Err(Error::unsupported_join(format!(
                    "join with {} has no ON condition",
                    table.id
                )))
            }
        };

        let (first, second) = equi_join_columns(on)?;
        let names_joined = |c: &ColumnRef| {
            c.table
                .as_deref()
                .is_some_and(|q| table.is_qualified_by(qualifier_tail(q)))
        };
        // The right key is the one naming the joined table.
        let (left, right) = if names_joined(&first) && !names_joined(&second) {
            (second, first)
        } else {
            (first, second)
        };

        Ok(JoinSpec {
            join_type,
            table,
            left,
            right,
        })
    }

    fn group_by(&self, group_by: &GroupByExpr) -> Result<Vec<ColumnRef>> {
        match group_by {
            GroupByExpr::Expressions(exprs, modifiers) => {
                if !modifiers.is_empty() {
                    return Err(Error::unsupported("GROUP BY modifiers (ROLLUP, CUBE)"));
                }
                exprs
                    .iter()
                    .map(|e| {
                        column_ref(e).ok_or_else(|| {
                            Error::unsupported(format!("GROUP BY expression {}; group by columns", e))
                        })
                    })
                    .collect()
            }
            GroupByExpr::All(_) => Err(Error::unsupported("GROUP BY ALL")),
        }
    }

    fn order_by(&mut self, order_by: Option<&sql::OrderBy>) -> Result<Vec<OrderByItem>> {
        let Some(order_by) = order_by else {
            return Ok(Vec::new());
        };
        let items = match &order_by.kind {
            OrderByKind::Expressions(items) => items,
            OrderByKind::All(_) => return Err(Error::unsupported("ORDER BY ALL")),
        };
        items
            .iter()
            .map(|item| {
                let expr = self.convert(&item.expr, AggregateMode::Reference)?;
                let order = if item.options.asc.unwrap_or(true) {
                    SortOrder::Asc
                } else {
                    SortOrder::Desc
                };
                Ok(OrderByItem { expr, order })
            })
            .collect()
    }

    fn limit_offset(&self, clause: Option<&LimitClause>) -> Result<(Option<u64>, Option<u64>)> {
        let (limit, offset) = match clause {
            None => (None, None),
            Some(LimitClause::LimitOffset {
                limit,
                offset,
                limit_by,
            }) => {
                if !limit_by.is_empty() {
                    return Err(Error::unsupported("LIMIT ... BY"));
                }
                (limit.as_ref(), offset.as_ref().map(|o| &o.value))
            }
            Some(LimitClause::OffsetCommaLimit { offset, limit }) => (Some(limit), Some(offset)),
        };
        let limit = limit.map(|e| literal_count(e, "LIMIT")).transpose()?;
        let offset = offset.map(|e| literal_count(e, "OFFSET")).transpose()?;
        Ok((limit, offset))
    }

    /// Converts a parsed expression into the engine's expression tree.
    fn convert(&mut self, expr: &sql::Expr, mode: AggregateMode) -> Result<Expr> {
        match expr {
            sql::Expr::Identifier(_) | sql::Expr::CompoundIdentifier(_) => column_ref(expr)
                .map(Expr::Column)
                .ok_or_else(|| Error::unsupported(format!("column reference {}", expr))),
            sql::Expr::Value(v) => literal(&v.value),
            sql::Expr::Nested(inner) => self.convert(inner, mode),
            sql::Expr::BinaryOp { left, op, right } => {
                let op = binary_op(op)
                    .ok_or_else(|| Error::unsupported(format!("operator {} in {}", op, expr)))?;
                Ok(Expr::binary(
                    self.convert(left, mode)?,
                    op,
                    self.convert(right, mode)?,
                ))
            }
            sql::Expr::UnaryOp { op, expr: inner } => match op {
                UnaryOperator::Not => Ok(Expr::not(self.convert(inner, mode)?)),
                UnaryOperator::Plus => self.convert(inner, mode),
                UnaryOperator::Minus => match self.convert(inner, mode)? {
                    Expr::Literal(Value::Number(n)) => Ok(Expr::Literal(Value::Number(-n))),
                    other => Ok(Expr::UnaryOp {
                        op: UnaryOp::Neg,
                        expr: Box::new(other),
                    }),
                },
                other => Err(Error::unsupported(format!("unary operator {}", other))),
            },
            sql::Expr::IsNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.convert(inner, mode)?),
                negated: false,
            }),
            sql::Expr::IsNotNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.convert(inner, mode)?),
                negated: true,
            }),
            sql::Expr::Between {
                expr: inner,
                negated,
                low,
                high,
            } => Ok(Expr::Between {
                expr: Box::new(self.convert(inner, mode)?),
                low: Box::new(self.convert(low, mode)?),
                high: Box::new(self.convert(high, mode)?),
                negated: *negated,
            }),
            sql::Expr::InList {
                expr: inner,
                list,
                negated,
            } => {
                let list = list
                    .iter()
                    .map(|e| self.convert(e, mode))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Expr::In {
                    expr: Box::new(self.convert(inner, mode)?),
                    list,
                    negated: *negated,
                })
            }
            sql::Expr::Like {
                negated,
                expr: inner,
                pattern,
                ..
            } => Ok(Expr::Like {
                expr: Box::new(self.convert(inner, mode)?),
                pattern: Box::new(self.convert(pattern, mode)?),
                negated: *negated,
            }),
            sql::Expr::Function(func) => self.convert_function(func, mode),
            sql::Expr::InSubquery { .. } | sql::Expr::Subquery(_) | sql::Expr::Exists { .. } => {
                Err(Error::unsupported("subqueries"))
            }
            other => Err(Error::unsupported(format!("expression {}", other))),
        }
    }

    fn convert_function(&mut self, func: &sql::Function, mode: AggregateMode) -> Result<Expr> {
        if func.over.is_some() {
            return Err(Error::unsupported("window functions"));
        }
        if let Some(kind) = aggregate_kind(func) {
            return match mode {
                AggregateMode::Forbidden(clause) => Err(Error::unsupported(format!(
                    "aggregate function {} in {}",
                    kind.name(),
                    clause
                ))),
                AggregateMode::Reference => {
                    let spec = aggregate_spec(kind, func)?;
                    Ok(Expr::Column(ColumnRef::bare(self.reference_aggregate(spec))))
                }
            };
        }

        let name = last_ident(&func.name)
            .ok_or_else(|| Error::unsupported(format!("function {}", func.name)))?;
        let args = match &func.args {
            FunctionArguments::None => Vec::new(),
            FunctionArguments::List(list) => {
                let mut args = Vec::with_capacity(list.args.len());
                for arg in &list.args {
                    match arg {
                        FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => {
                            args.push(self.convert(e, mode)?)
                        }
                        other => {
                            return Err(Error::unsupported(format!(
                                "argument {} of {}",
                                other, name
                            )))
                        }
                    }
                }
                args
            }
            FunctionArguments::Subquery(_) => return Err(Error::unsupported("subqueries")),
        };
        Ok(Expr::function(&name, args))
    }

    /// Returns the column label of an aggregate used outside SELECT,
    /// registering it as hidden when SELECT does not already compute it.
    fn reference_aggregate(&mut self, spec: AggregateSpec) -> String {
        let display = spec.display_name();
        let exists = self
            .aggregates
            .iter()
            .any(|a| a.display_name().eq_ignore_ascii_case(&display));
        if !exists {
            self.aggregates.push(AggregateSpec {
                visible: false,
                ..spec
            });
        }
        display
    }
}

/// Rejects plain SELECT items not covered by GROUP BY in aggregated plans.
fn validate_grouping(plan: &QueryPlan) -> Result<()> {
    if !plan.is_aggregate() {
        return Ok(());
    }
    for item in &plan.projection {
        match item {
            ProjectionItem::Wildcard { .. } => {
                return Err(Error::column_resolution(
                    "* cannot be combined with GROUP BY or aggregate functions",
                ))
            }
            ProjectionItem::Expr { expr, .. } => {
                for col in expr.columns() {
                    if !plan.group_by.iter().any(|g| same_grouped_column(plan, g, col)) {
                        return Err(Error::column_resolution(format!(
                            "column {} must appear in GROUP BY or be used in an aggregate function",
                            col
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Returns true if both references denote the same column. Qualifiers match
/// when they are equal or name the same table, by alias or table name.
fn same_grouped_column(plan: &QueryPlan, a: &ColumnRef, b: &ColumnRef) -> bool {
    if !a.column.eq_ignore_ascii_case(&b.column) {
        return false;
    }
    match (a.table.as_deref(), b.table.as_deref()) {
        (Some(x), Some(y)) => {
            let (x, y) = (qualifier_tail(x), qualifier_tail(y));
            x.eq_ignore_ascii_case(y)
                || plan
                    .tables()
                    .any(|t| t.is_qualified_by(x) && t.is_qualified_by(y))
        }
        _ => true,
    }
}

fn aggregate_kind(func: &sql::Function) -> Option<AggregateFunc> {
    if func.over.is_some() {
        return None;
    }
    last_ident(&func.name).and_then(|name| AggregateFunc::from_name(&name))
}

fn aggregate_spec(kind: AggregateFunc, func: &sql::Function) -> Result<AggregateSpec> {
    let name = kind.name();
    let list = match &func.args {
        FunctionArguments::List(list) => list,
        _ => return Err(Error::unsupported(format!("{} without arguments", name))),
    };
    if func.filter.is_some() || !list.clauses.is_empty() {
        return Err(Error::unsupported(format!("{} with extra clauses", name)));
    }
    let distinct = matches!(list.duplicate_treatment, Some(DuplicateTreatment::Distinct));
    let arg = match list.args.as_slice() {
        [FunctionArg::Unnamed(FunctionArgExpr::Wildcard)]
        | [FunctionArg::Unnamed(FunctionArgExpr::QualifiedWildcard(_))] => AggregateArg::Star,
        [FunctionArg::Unnamed(FunctionArgExpr::Expr(e))] => {
            AggregateArg::Column(column_ref(unwrap_nested(e)).ok_or_else(|| {
                Error::unsupported(format!("{}({}); aggregate a single column", name, e))
            })?)
        }
        _ => {
            return Err(Error::unsupported(format!(
                "{} takes exactly one column or *",
                name
            )))
        }
    };

    if arg == AggregateArg::Star {
        if kind != AggregateFunc::Count {
            return Err(Error::aggregate_on_wildcard(name));
        }
        if distinct {
            return Err(Error::unsupported("COUNT(DISTINCT *)"));
        }
    }

    Ok(AggregateSpec {
        func: kind,
        arg,
        distinct,
        alias: None,
        visible: true,
    })
}

/// Extracts the two columns of `a = b`.
fn equi_join_columns(on: &sql::Expr) -> Result<(ColumnRef, ColumnRef)> {
    if let sql::Expr::BinaryOp {
        left,
        op: BinaryOperator::Eq,
        right,
    } = unwrap_nested(on)
    {
        if let (Some(l), Some(r)) = (
            column_ref(unwrap_nested(left)),
            column_ref(unwrap_nested(right)),
        ) {
            return Ok((l, r));
        }
    }
    Err(Error::unsupported_join(format!(
        "ON {}; expected exactly one equality between two columns",
        on
    )))
}

fn column_ref(expr: &sql::Expr) -> Option<ColumnRef> {
    match expr {
        sql::Expr::Identifier(ident) => Some(ColumnRef::bare(ident.value.clone())),
        sql::Expr::CompoundIdentifier(parts) => match parts.as_slice() {
            [.., table, column] => Some(ColumnRef::qualified(
                qualifier_tail(&table.value),
                column.value.clone(),
            )),
            [column] => Some(ColumnRef::bare(column.value.clone())),
            [] => None,
        },
        sql::Expr::Nested(inner) => column_ref(inner),
        _ => None,
    }
}

/// A quoted `"book.Sheet1"` qualifier names the sheet.
fn qualifier_tail(qualifier: &str) -> &str {
    qualifier.rsplit('.').next().unwrap_or(qualifier)
}

fn last_ident(name: &sql::ObjectName) -> Option<String> {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
}

fn unwrap_nested(expr: &sql::Expr) -> &sql::Expr {
    match expr {
        sql::Expr::Nested(inner) => unwrap_nested(inner),
        other => other,
    }
}

fn literal(value: &sql::Value) -> Result<Expr> {
    let value = match value {
        sql::Value::Number(n, _) => match parse_number(n) {
            Some(d) => Value::Number(d),
            None => Value::Text(n.clone()),
        },
        sql::Value::SingleQuotedString(s) | sql::Value::DoubleQuotedString(s) => {
            Value::Text(s.clone())
        }
        sql::Value::Boolean(b) => Value::Boolean(*b),
        sql::Value::Null => Value::Null,
        other => return Err(Error::unsupported(format!("literal {}", other))),
    };
    Ok(Expr::Literal(value))
}

fn literal_count(expr: &sql::Expr, clause: &str) -> Result<u64> {
    if let sql::Expr::Value(v) = expr {
        if let sql::Value::Number(n, _) = &v.value {
            if let Ok(count) = n.parse::<u64>() {
                return Ok(count);
            }
        }
    }
    Err(Error::unsupported(format!(
        "{} {}; expected a non-negative integer literal",
        clause, expr
    )))
}

fn binary_op(op: &BinaryOperator) -> Option<BinaryOp> {
    Some(match op {
        BinaryOperator::Plus => BinaryOp::Add,
        BinaryOperator::Minus => BinaryOp::Sub,
        BinaryOperator::Multiply => BinaryOp::Mul,
        BinaryOperator::Divide => BinaryOp::Div,
        BinaryOperator::Modulo => BinaryOp::Mod,
        BinaryOperator::StringConcat => BinaryOp::Concat,
        BinaryOperator::Eq => BinaryOp::Eq,
        BinaryOperator::NotEq => BinaryOp::Ne,
        BinaryOperator::Lt => BinaryOp::Lt,
        BinaryOperator::LtEq => BinaryOp::Le,
        BinaryOperator::Gt => BinaryOp::Gt,
        BinaryOperator::GtEq => BinaryOp::Ge,
        BinaryOperator::And => BinaryOp::And,
        BinaryOperator::Or => BinaryOp::Or,
        _ => return None,
    })
}
