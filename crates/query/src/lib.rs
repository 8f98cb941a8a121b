//! cellsql query - SQL execution over in-memory tables.
//!
//! This crate provides the query engine on top of `cellsql-core`:
//!
//! - `ast`: expression tree shared by WHERE, HAVING, projection and ORDER BY
//! - `parser`: statement text to syntax tree, via `sqlparser`
//! - `planner`: the query plan and the compiler producing it
//! - `executor`: table loading, hash join, filter, aggregate, projection,
//!   sort, limit and the pipeline runner
//!
//! # Example
//!
//! ```rust
//! use cellsql_core::schema::TableId;
//! use cellsql_core::ColumnType;
//! use cellsql_query::{InMemoryDataProvider, QueryEngine};
//!
//! let mut provider = InMemoryDataProvider::new();
//! provider.add_table(
//!     TableId::new("SA", "T1"),
//!     &[("id", ColumnType::Numeric), ("name", ColumnType::Text)],
//!     vec![
//!         vec![Some("1".into()), Some("Alice".into())],
//!         vec![Some("2".into()), Some("Bob".into())],
//!     ],
//! );
//!
//! let engine = QueryEngine::new(&provider);
//! let result = engine
//!     .execute_query("SELECT name FROM T1 WHERE id = 2")
//!     .unwrap();
//! assert_eq!(result.row_count(), 1);
//! assert_eq!(result.value(0, 0), Some("Bob"));
//! ```

pub mod ast;
pub mod executor;
pub mod parser;
pub mod planner;

pub use executor::{DataProvider, InMemoryDataProvider, QueryEngine};
pub use planner::{QueryCompiler, QueryPlan};
