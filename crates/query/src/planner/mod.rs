//! Query planning: the plan model and the compiler that builds it.

mod compiler;
mod plan;

pub use compiler::QueryCompiler;
pub use plan::{
    AggregateArg, AggregateSpec, JoinSpec, OrderByItem, ProjectionItem, QueryPlan, TableRef,
};
