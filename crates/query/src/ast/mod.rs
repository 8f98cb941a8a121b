//! AST module for compiled expressions.

mod expr;

pub use expr::{AggregateFunc, BinaryOp, ColumnRef, Expr, JoinType, SortOrder, UnaryOp};
