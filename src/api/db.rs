use log::debug;
use serde::Serialize;

use crate::catalog::{Catalog, Row};
use crate::config::PlannerConfig;
use crate::exec::metrics::Metrics;
use crate::exec::run;
use crate::frontend::sql::parser::parse;
use crate::frontend::sql::pretty_ast::pretty_ast;
use crate::ir::plan::QueryPlan;
use crate::ir::pretty::render;
use crate::ir::tree::PlanTree;
use crate::ir::validate::validate;
use crate::optimizer::errors::OptimizerError;
use crate::optimizer::{Optimized, Optimizer};
use crate::physical::lower;
use crate::planner::logical::LogicalPlanner;

use super::errors::QueryError;

/// Everything a caller needs to show a query before and after optimization.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub limit: Option<usize>,

    pub unoptimized_tree: PlanTree,
    pub optimized_tree: PlanTree,
    pub optimized_physical: PlanTree,
    pub applied_rules: Vec<&'static str>,

    pub unoptimized_metrics: Metrics,
    pub optimized_metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Planned {
    pub unoptimized: QueryPlan,
    pub optimized: Optimized,
}

pub struct QueryPlanner {
    config: PlannerConfig,
}

impl QueryPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn plan(&self, sql: &str, catalog: &Catalog) -> Result<Planned, QueryError> {
        let stmt = parse(sql)?;
        debug!("parsed statement:\n{}", pretty_ast(&stmt));

        let unoptimized = LogicalPlanner::new(catalog).plan(&stmt)?;
        validate(&unoptimized.root).map_err(|e| OptimizerError::invariant("planner", e))?;

        let optimized = Optimizer::new(self.config.optimizer.clone()).optimize(&unoptimized, catalog)?;
        Ok(Planned {
            unoptimized,
            optimized,
        })
    }

    /// Runs the unoptimized and the optimized plan and reports both.
    pub fn plan_and_run(&self, sql: &str, catalog: &Catalog) -> Result<PlanResult, QueryError> {
        let Planned {
            unoptimized,
            optimized,
        } = self.plan(sql, catalog)?;

        let before = lower(&unoptimized).map_err(|e| OptimizerError::invariant("lower", e))?;
        let after = lower(&optimized.plan).map_err(|e| OptimizerError::invariant("lower", e))?;

        let (_, unoptimized_metrics) = run(&before, catalog)?;
        let (rows, optimized_metrics) = run(&after, catalog)?;
        debug!(
            "join input {} -> {} tuples after {:?}",
            unoptimized_metrics.join_rows_in(),
            optimized_metrics.join_rows_in(),
            optimized.applied
        );

        Ok(PlanResult {
            columns: after.columns.clone(),
            rows,
            limit: unoptimized.limit,
            unoptimized_tree: PlanTree::from(&unoptimized.root),
            optimized_tree: PlanTree::from(&optimized.plan.root),
            optimized_physical: PlanTree::from(&after),
            applied_rules: optimized.applied,
            unoptimized_metrics,
            optimized_metrics,
        })
    }
}

impl Default for QueryPlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

pub fn plan_and_run(sql: &str, catalog: &Catalog) -> Result<PlanResult, QueryError> {
    QueryPlanner::default().plan_and_run(sql, catalog)
}

impl PlanResult {
    pub fn report(&self) -> String {
        let mut out = String::new();
        out.push_str("== unoptimized plan ==\n");
        out.push_str(&render(&self.unoptimized_tree));
        out.push_str("\n== optimized plan ==\n");
        out.push_str(&render(&self.optimized_tree));
        if !self.applied_rules.is_empty() {
            out.push_str(&format!("(rules: {})\n", self.applied_rules.join(", ")));
        }
        out.push_str("\n== physical plan ==\n");
        out.push_str(&render(&self.optimized_physical));
        out.push_str("\n== metrics ==\n");
        out.push_str(&metrics_line("unoptimized", &self.unoptimized_metrics));
        out.push_str(&metrics_line("optimized", &self.optimized_metrics));
        out.push_str("\n== result ==\n");
        out.push_str(&self.columns.join(" | "));
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }
        out.push_str(&format!("({} row(s))\n", self.rows.len()));
        out
    }
}

fn metrics_line(name: &str, metrics: &Metrics) -> String {
    format!(
        "{name}: {}us, scanned {}, join input {}, emitted {}\n",
        metrics.elapsed.as_micros(),
        metrics.rows_scanned,
        metrics.join_rows_in(),
        metrics.rows_emitted
    )
}
