//! Query orchestration.
//!
//! [`QueryEngine`] runs one statement through a strictly sequential
//! pipeline:
//!
//! ```text
//! compile -> load tables -> join chain -> filter -> aggregate -> build result
//! ```
//!
//! Any stage failure aborts the run and surfaces that stage's error; no
//! partial result is returned. The engine keeps no state between
//! statements, so one engine (or several) may serve concurrent callers as
//! long as the provider allows concurrent reads.

use crate::executor::{
    AggregateExecutor, DataProvider, FilterExecutor, HashJoin, Relation, ResultBuilder,
    TableLoader,
};
use crate::planner::{QueryCompiler, QueryPlan};
use cellsql_core::{EngineConfig, QueryResult, Result};
use tracing::{debug, info, warn};

/// Executes statements against the tables of a [`DataProvider`].
pub struct QueryEngine<'a, P: DataProvider + ?Sized> {
    provider: &'a P,
    config: EngineConfig,
}

impl<'a, P: DataProvider + ?Sized> QueryEngine<'a, P> {
    /// Creates an engine with the default configuration.
    pub fn new(provider: &'a P) -> Self {
        Self::with_config(provider, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    pub fn with_config(provider: &'a P, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compiles and executes statement text.
    pub fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let result = self.compile_and_run(sql);
        match &result {
            Err(e) if e.is_compile_error() => debug!(error = %e, "statement rejected"),
            Err(e) => warn!(error = %e, "query failed"),
            Ok(_) => {}
        }
        result
    }

    fn compile_and_run(&self, sql: &str) -> Result<QueryResult> {
        let plan = QueryCompiler::new(&self.config).compile_sql(sql)?;
        debug!(
            source = %plan.source.id,
            joins = plan.joins.len(),
            aggregates = plan.aggregates.len(),
            "plan compiled"
        );
        let result = self.execute_plan(&plan)?;
        info!(
            rows = result.row_count(),
            columns = result.column_count(),
            "query executed"
        );
        Ok(result)
    }

    /// Executes an already compiled plan.
    pub fn execute_plan(&self, plan: &QueryPlan) -> Result<QueryResult> {
        let scale = self.config.decimal_scale;
        let loader = TableLoader::new(self.provider);

        let source = loader
            .load(&plan.source.id)?
            .with_alias(plan.source.alias.clone());
        let mut relation = Relation::from_table(&source);

        for join in &plan.joins {
            let table = loader
                .load(&join.table.id)?
                .with_alias(join.table.alias.clone());
            relation = HashJoin::new(join).execute(relation, &table)?;
        }

        if let Some(filter) = &plan.filter {
            relation = FilterExecutor::new(filter)
                .with_scale(scale)
                .execute(relation);
        }

        let relation = AggregateExecutor::new(plan)
            .with_scale(scale)
            .execute(relation)?;

        Ok(ResultBuilder::new(plan).with_scale(scale).build(relation))
    }
}
