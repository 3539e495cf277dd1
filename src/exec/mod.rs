//! Pull-based executor over physical plans.

pub mod errors;
pub mod expr_eval;
pub mod filter;
pub mod join;
pub mod metrics;
pub mod operator;
pub mod project;
pub mod scan;
pub mod value_cmp;

use std::time::Instant;

use log::info;

use crate::catalog::Catalog;
use crate::exec::errors::ExecutionError;
use crate::exec::filter::FilterExec;
use crate::exec::join::NestedLoopJoinExec;
use crate::exec::metrics::{Metrics, OperatorMetrics};
use crate::exec::operator::{Operator, Row};
use crate::exec::project::ProjectExec;
use crate::exec::scan::ScanExec;
use crate::physical::plan::{PhysicalNode, PhysicalPlan};

/// Builds the operator tree for a physical plan. Operators are numbered in
/// pre-order for metrics.
pub fn build<'a>(node: &PhysicalNode, catalog: &'a Catalog) -> Box<dyn Operator + 'a> {
    let mut next_id = 0;
    build_node(node, catalog, &mut next_id)
}

fn build_node<'a>(
    node: &PhysicalNode,
    catalog: &'a Catalog,
    next_id: &mut usize,
) -> Box<dyn Operator + 'a> {
    let stats = OperatorMetrics::new(*next_id, node.kind(), node.label());
    *next_id += 1;

    match node {
        PhysicalNode::SeqScan { table, .. } => {
            Box::new(ScanExec::new(catalog, table.clone(), stats))
        }
        PhysicalNode::Filter { input, predicate } => {
            let input = build_node(input, catalog, next_id);
            Box::new(FilterExec::new(input, predicate.clone(), stats))
        }
        PhysicalNode::Project { input, exprs } => {
            let input = build_node(input, catalog, next_id);
            let exprs = exprs.iter().map(|(e, _)| e.clone()).collect();
            Box::new(ProjectExec::new(input, exprs, stats))
        }
        PhysicalNode::NestedLoopJoin {
            left,
            right,
            predicate,
        } => {
            let left = build_node(left, catalog, next_id);
            let right = build_node(right, catalog, next_id);
            Box::new(NestedLoopJoinExec::new(left, right, predicate.clone(), stats))
        }
    }
}

/// Single-pass stream of result rows. LIMIT stops pulling from the plan as
/// soon as it is met.
pub struct RowStream<'a> {
    root: Box<dyn Operator + 'a>,
    limit: Option<usize>,
    emitted: usize,
    done: bool,
    started: Instant,
}

impl<'a> RowStream<'a> {
    pub fn finish(mut self) -> Metrics {
        self.root.close();

        let mut operators = Vec::new();
        self.root.collect_metrics(&mut operators);
        let rows_scanned = operators
            .iter()
            .filter(|m| m.operator == "Scan")
            .map(|m| m.rows_out)
            .sum();

        Metrics {
            elapsed: self.started.elapsed(),
            rows_scanned,
            rows_emitted: self.emitted,
            operators,
        }
    }
}

impl<'a> Iterator for RowStream<'a> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.done || self.limit.is_some_and(|n| self.emitted >= n) {
            self.done = true;
            return None;
        }
        match self.root.next() {
            Some(row) => {
                self.emitted += 1;
                Some(row)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Opens the plan and returns its row stream. `LIMIT 0` never opens the plan.
pub fn execute<'a>(plan: &PhysicalPlan, catalog: &'a Catalog) -> Result<RowStream<'a>, ExecutionError> {
    let started = Instant::now();
    let mut root = build(&plan.root, catalog);
    let done = plan.limit == Some(0);
    if !done {
        root.open()?;
    }
    Ok(RowStream {
        root,
        limit: plan.limit,
        emitted: 0,
        done,
        started,
    })
}

pub fn run(plan: &PhysicalPlan, catalog: &Catalog) -> Result<(Vec<Row>, Metrics), ExecutionError> {
    let mut stream = execute(plan, catalog)?;
    let rows: Vec<Row> = stream.by_ref().collect();
    let metrics = stream.finish();
    info!(
        "run emitted {} row(s), scanned {} in {:?}",
        metrics.rows_emitted, metrics.rows_scanned, metrics.elapsed
    );
    Ok((rows, metrics))
}
