//! Column type hints.
//!
//! Spreadsheet sources only hint at a column's type. Hints are advisory:
//! every cell is still stored and compared as text, and a hint never causes
//! a value to be rejected.

use core::fmt;
use core::str::FromStr;

/// Advisory type of a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Numbers of any precision
    Numeric,
    /// Free text
    #[default]
    Text,
    /// true/false
    Boolean,
    /// Dates and timestamps
    Date,
}

impl ColumnType {
    /// Maps a provider type name (`DOUBLE`, `VARCHAR`, `BIT`, ...) to a hint.
    ///
    /// Unknown names map to `Text`.
    pub fn from_sql_name(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or("").trim();
        match base {
            "DOUBLE" | "FLOAT" | "REAL" | "DECIMAL" | "NUMERIC" | "NUMBER" | "INTEGER"
            | "INT" | "BIGINT" | "SMALLINT" | "TINYINT" => ColumnType::Numeric,
            "BIT" | "BOOLEAN" | "BOOL" => ColumnType::Boolean,
            "DATE" | "TIME" | "TIMESTAMP" | "DATETIME" => ColumnType::Date,
            _ => ColumnType::Text,
        }
    }

    /// Returns the type name reported to result consumers.
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "DOUBLE",
            ColumnType::Text => "VARCHAR",
            ColumnType::Boolean => "BIT",
            ColumnType::Date => "DATE",
        }
    }
}

impl FromStr for ColumnType {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ColumnType::from_sql_name(s))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}
