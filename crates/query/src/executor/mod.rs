//! Query executor module.
//!
//! Each stage consumes a [`Relation`] and produces a new one with its own
//! column index map; nothing is shared or mutated across stages.

mod aggregate;
mod builder;
mod eval;
mod filter;
pub mod join;
mod limit;
mod project;
mod relation;
mod runner;
mod scan;
mod sort;

pub use aggregate::AggregateExecutor;
pub use builder::ResultBuilder;
pub use eval::{evaluate, ExpressionEvaluator, DEFAULT_DECIMAL_SCALE};
pub use filter::FilterExecutor;
pub use join::HashJoin;
pub use limit::LimitExecutor;
pub use project::{ProjectExecutor, Projection};
pub use relation::Relation;
pub use runner::QueryEngine;
pub use scan::{DataProvider, InMemoryDataProvider, TableLoader};
pub use sort::SortExecutor;
