//! Statement parsing.
//!
//! Parsing is delegated to `sqlparser` with the generic dialect. This module
//! only narrows its output to a single SELECT query.

use cellsql_core::{Error, Result};
use sqlparser::ast::{Query, Statement};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Parses `sql` into the AST of one SELECT query.
///
/// Parser failures become [`Error::Syntax`] carrying the statement text.
/// Empty input is a syntax error; several statements or a non-query
/// statement are unsupported.
pub fn parse_query(sql: &str) -> Result<Box<Query>> {
    let statements = Parser::parse_sql(&GenericDialect {}, sql)
        .map_err(|e| Error::syntax(format!("{} in statement: {}", e, sql.trim())))?;

    let mut statements = statements.into_iter();
    let statement = match (statements.next(), statements.next()) {
        (Some(statement), None) => statement,
        (None, _) => return Err(Error::syntax("empty statement")),
        (Some(_), Some(_)) => return Err(Error::unsupported("multi-statement scripts")),
    };

    match statement {
        Statement::Query(query) => Ok(query),
        other => Err(Error::unsupported(format!(
            "only SELECT statements are supported, got: {}",
            other
        ))),
    }
}
