//! Error types for the cellsql query engine.
//!
//! Every error is terminal for the statement that raised it. Row-level
//! anomalies (unparseable numbers, missing columns during evaluation,
//! division by zero) are not errors; they evaluate to `Value::Null`.

use thiserror::Error;

/// Result type alias for cellsql operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error kinds surfaced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The statement text could not be parsed.
    #[error("Syntax error: {message}")]
    Syntax { message: String },
    /// A parsed construct outside the supported SELECT subset.
    #[error("Unsupported syntax: {message}")]
    UnsupportedSyntax { message: String },
    /// A JOIN whose condition is not a single column equality.
    #[error("Unsupported join condition: {message}")]
    UnsupportedJoinCondition { message: String },
    /// The data provider does not know the table.
    #[error("Table not found: {name}")]
    TableNotFound { name: String },
    /// The data provider returned an inconsistent table.
    #[error("Invalid table {name}: {message}")]
    InvalidTable { name: String, message: String },
    /// A join key column is missing from its side of the join.
    #[error("Join column {column} not found in {side} side of join with {table}")]
    JoinColumnNotFound {
        column: String,
        side: &'static str,
        table: String,
    },
    /// A column required by the plan cannot be resolved.
    #[error("Column resolution failed: {message}")]
    ColumnResolution { message: String },
    /// SUM, AVG, MAX or MIN applied to `*`.
    #[error("{function}(*) is not allowed")]
    AggregateOnWildcard { function: String },
    /// The engine configuration could not be parsed.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    /// Creates a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Error::Syntax {
            message: message.into(),
        }
    }

    /// Creates an unsupported syntax error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::UnsupportedSyntax {
            message: message.into(),
        }
    }

    /// Creates an unsupported join condition error.
    pub fn unsupported_join(message: impl Into<String>) -> Self {
        Error::UnsupportedJoinCondition {
            message: message.into(),
        }
    }

    /// Creates a table not found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }

    /// Creates an invalid table error.
    pub fn invalid_table(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidTable {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a join column error for the left or right side of a join.
    pub fn join_column_not_found(
        column: impl Into<String>,
        side: &'static str,
        table: impl Into<String>,
    ) -> Self {
        Error::JoinColumnNotFound {
            column: column.into(),
            side,
            table: table.into(),
        }
    }

    /// Creates a column resolution error.
    pub fn column_resolution(message: impl Into<String>) -> Self {
        Error::ColumnResolution {
            message: message.into(),
        }
    }

    /// Creates an aggregate-on-wildcard error.
    pub fn aggregate_on_wildcard(function: impl Into<String>) -> Self {
        Error::AggregateOnWildcard {
            function: function.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true if the statement was rejected before any table was read.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Error::Syntax { .. }
                | Error::UnsupportedSyntax { .. }
                | Error::UnsupportedJoinCondition { .. }
                | Error::AggregateOnWildcard { .. }
        )
    }
}
