//! cellsql core - values, tables and schema types for the cellsql engine.
//!
//! This crate provides the foundational types shared by the query compiler
//! and executors:
//!
//! - `Value`: runtime values with numeric-or-lexical comparison
//! - `Row`: an ordered sequence of optional text cells
//! - `schema`: table identifiers, loaded tables and the column index map
//! - `QueryResult`: column names, type hints and a column-major cell matrix
//! - `EngineConfig`: explicitly passed engine settings
//! - `Error`: the error taxonomy
//!
//! # Example
//!
//! ```rust
//! use cellsql_core::schema::{Table, TableId};
//! use cellsql_core::{ColumnType, Row};
//!
//! let table = Table::new(
//!     TableId::new("SA", "T1"),
//!     vec!["id".into(), "name".into()],
//!     vec![ColumnType::Numeric, ColumnType::Text],
//!     vec![
//!         vec![Some("1".into()), Some("2".into())],
//!         vec![Some("Alice".into()), Some("Bob".into())],
//!     ],
//!     2,
//! )
//! .unwrap();
//!
//! let row: Row = table.row(0).unwrap();
//! assert_eq!(row.get(1), Some("Alice"));
//! ```

mod config;
mod error;
pub mod pattern_match;
mod result;
mod row;
pub mod schema;
mod types;
mod value;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use result::QueryResult;
pub use row::Row;
pub use types::ColumnType;
pub use value::{
    compare_cells, compare_sort_keys, compare_text, compare_values, parse_number,
    round_to_scale, Cell, Value,
};

pub use rust_decimal::Decimal;
