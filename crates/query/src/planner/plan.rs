//! The query plan: a normalized, immutable description of one statement.

use crate::ast::{AggregateFunc, ColumnRef, Expr, JoinType, SortOrder};
use cellsql_core::schema::TableId;
use core::fmt;

/// A table named in FROM or JOIN.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRef {
    /// Resolved two-part identifier.
    pub id: TableId,
    /// Alias given in the statement.
    pub alias: Option<String>,
}

impl TableRef {
    /// Creates a table descriptor.
    pub fn new(id: TableId, alias: Option<String>) -> Self {
        Self { id, alias }
    }

    /// Returns true if `qualifier` names this table by alias or table name.
    pub fn is_qualified_by(&self, qualifier: &str) -> bool {
        self.alias
            .as_deref()
            .is_some_and(|a| a.eq_ignore_ascii_case(qualifier))
            || self.id.table().eq_ignore_ascii_case(qualifier)
    }
}

/// One equi-join step of the join chain.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinSpec {
    /// Join type.
    pub join_type: JoinType,
    /// The table joined onto the accumulated left side.
    pub table: TableRef,
    /// Key column on the accumulated left side.
    pub left: ColumnRef,
    /// Key column on the joined table.
    pub right: ColumnRef,
}

/// Argument of an aggregate call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggregateArg {
    /// `*`
    Star,
    /// A single column.
    Column(ColumnRef),
}

impl fmt::Display for AggregateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateArg::Star => f.write_str("*"),
            AggregateArg::Column(c) => write!(f, "{}", c),
        }
    }
}

/// One aggregate call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateSpec {
    pub func: AggregateFunc,
    pub arg: AggregateArg,
    pub distinct: bool,
    pub alias: Option<String>,
    /// Hidden aggregates are computed for HAVING or ORDER BY but not output.
    pub visible: bool,
}

impl AggregateSpec {
    /// Creates a visible, non-distinct aggregate without alias.
    pub fn new(func: AggregateFunc, arg: AggregateArg) -> Self {
        Self {
            func,
            arg,
            distinct: false,
            alias: None,
            visible: true,
        }
    }

    /// Canonical label, e.g. `COUNT(*)` or `SUM(DISTINCT price)`.
    pub fn display_name(&self) -> String {
        if self.distinct {
            format!("{}(DISTINCT {})", self.func.name(), self.arg)
        } else {
            format!("{}({})", self.func.name(), self.arg)
        }
    }

    /// Output label: the alias if present, else the display name.
    pub fn label(&self) -> String {
        self.alias.clone().unwrap_or_else(|| self.display_name())
    }
}

/// One SELECT item that is not an aggregate.
#[derive(Clone, Debug, PartialEq)]
pub enum ProjectionItem {
    /// `*` or `qualifier.*`
    Wildcard { qualifier: Option<String> },
    /// A column or a computed expression.
    Expr {
        expr: Expr,
        alias: Option<String>,
        /// The expression as written, used as label when unaliased and not
        /// a plain column.
        text: String,
    },
}

/// One ORDER BY key.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderByItem {
    pub expr: Expr,
    pub order: SortOrder,
}

/// Structural representation of one SELECT statement.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryPlan {
    /// Plain SELECT items, in statement order.
    pub projection: Vec<ProjectionItem>,
    /// Aggregate calls; visible ones are output after the plain items.
    pub aggregates: Vec<AggregateSpec>,
    /// The FROM table.
    pub source: TableRef,
    /// Joins in statement order.
    pub joins: Vec<JoinSpec>,
    /// WHERE.
    pub filter: Option<Expr>,
    /// GROUP BY columns.
    pub group_by: Vec<ColumnRef>,
    /// HAVING, with aggregate calls rewritten to references by display name.
    pub having: Option<Expr>,
    /// ORDER BY keys.
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryPlan {
    /// Creates a `SELECT * FROM source` plan.
    pub fn scan(source: TableRef) -> Self {
        Self {
            projection: vec![ProjectionItem::Wildcard { qualifier: None }],
            aggregates: Vec::new(),
            source,
            joins: Vec::new(),
            filter: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Returns true if the statement aggregates (aggregates or GROUP BY).
    pub fn is_aggregate(&self) -> bool {
        !self.aggregates.is_empty() || !self.group_by.is_empty()
    }

    /// Every table the plan reads, FROM first.
    pub fn tables(&self) -> impl Iterator<Item = &TableRef> {
        core::iter::once(&self.source).chain(self.joins.iter().map(|j| &j.table))
    }
}
