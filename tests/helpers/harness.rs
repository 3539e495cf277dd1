#![allow(dead_code)]

use std::collections::BTreeSet;

use relplan::api::{PlanResult, Planned, QueryPlanner};
use relplan::catalog::{Catalog, Row};
use relplan::config::{OptimizerConfig, PlannerConfig};
use relplan::exec::run;
use relplan::ir::expr::ColumnRef;
use relplan::ir::plan::LogicalPlan;
use relplan::ir::tree::PlanTree;
use relplan::physical::lower;

pub struct TestDB {
    pub catalog: Catalog,
    planner: QueryPlanner,
}

impl TestDB {
    pub fn new(catalog: Catalog) -> Self {
        super::init_logging();
        Self {
            catalog,
            planner: QueryPlanner::default(),
        }
    }

    pub fn with_optimizer(catalog: Catalog, optimizer: OptimizerConfig) -> Self {
        super::init_logging();
        Self {
            catalog,
            planner: QueryPlanner::new(PlannerConfig { optimizer }),
        }
    }

    pub fn query(&self, sql: &str) -> anyhow::Result<PlanResult> {
        Ok(self.planner.plan_and_run(sql, &self.catalog)?)
    }

    pub fn plan(&self, sql: &str) -> anyhow::Result<Planned> {
        Ok(self.planner.plan(sql, &self.catalog)?)
    }

    /// Rows of the unoptimized and the optimized tree.
    pub fn run_both(&self, sql: &str) -> anyhow::Result<(Vec<Row>, Vec<Row>)> {
        let planned = self.plan(sql)?;
        let (before, _) = run(&lower(&planned.unoptimized)?, &self.catalog)?;
        let (after, _) = run(&lower(&planned.optimized.plan)?, &self.catalog)?;
        Ok((before, after))
    }
}

/// Rows rendered and sorted, for order-insensitive multiset comparison.
pub fn multiset(rows: &[Row]) -> Vec<String> {
    let mut out: Vec<String> = rows
        .iter()
        .map(|r| {
            r.iter()
                .map(|v| format!("{v:?}"))
                .collect::<Vec<_>>()
                .join("|")
        })
        .collect();
    out.sort();
    out
}

/// Checks that nothing below a join emits a column unused by every ancestor
/// predicate and the final projection. The input of a narrowing projection is
/// exempt, as is a lone fallback column when a side needs nothing at all.
pub fn assert_minimal(plan: &LogicalPlan) {
    check_minimal(plan, &BTreeSet::new(), false, true);
}

fn check_minimal(plan: &LogicalPlan, required: &BTreeSet<ColumnRef>, under_join: bool, exempt: bool) {
    let checked = under_join && !exempt && !matches!(plan, LogicalPlan::Select(_));
    if checked {
        let schema = plan.output_schema();
        let unused: Vec<String> = schema
            .iter()
            .filter(|c| !required.iter().any(|r| r.same_column(c)))
            .map(|c| c.to_string())
            .collect();
        let fallback = schema.len() == 1;
        assert!(
            unused.is_empty() || fallback,
            "{} emits unused columns {unused:?}",
            PlanTree::from(plan).label
        );
    }

    match plan {
        LogicalPlan::Scan(_) => {}
        LogicalPlan::Select(select) => {
            let mut below = required.clone();
            select.predicate.collect_columns(&mut below);
            check_minimal(&select.input, &below, under_join, exempt);
        }
        LogicalPlan::Project(project) => {
            let mut below = BTreeSet::new();
            for (expr, _) in &project.exprs {
                expr.collect_columns(&mut below);
            }
            check_minimal(&project.input, &below, under_join, true);
        }
        LogicalPlan::Join(join) => {
            let mut needed = required.clone();
            if let Some(on) = &join.on {
                on.collect_columns(&mut needed);
            }
            check_minimal(&join.left, &needed, true, false);
            check_minimal(&join.right, &needed, true, false);
        }
    }
}
