//! Heuristic rewrite driver.
//!
//! Rules run in a fixed order, each repeated until the tree stops changing.
//! Every intermediate tree is validated before it is accepted.

pub mod errors;
pub mod rules;

use log::{debug, trace, warn};

use crate::catalog::Catalog;
use crate::config::OptimizerConfig;
use crate::ir::expr::ColumnRef;
use crate::ir::plan::{LogicalPlan, QueryPlan};
use crate::ir::pretty::pretty;
use crate::ir::validate::validate;
use crate::optimizer::errors::OptimizerError;
use crate::optimizer::rules::{join_reorder, predicate_pushdown, projection_pushdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    PredicatePushdown,
    ProjectionPushdown,
    JoinReorder,
}

impl Rule {
    pub const ALL: [Rule; 3] = [
        Rule::PredicatePushdown,
        Rule::ProjectionPushdown,
        Rule::JoinReorder,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::PredicatePushdown => "predicate_pushdown",
            Rule::ProjectionPushdown => "projection_pushdown",
            Rule::JoinReorder => "join_reorder",
        }
    }

    fn enabled(&self, config: &OptimizerConfig) -> bool {
        match self {
            Rule::PredicatePushdown => config.predicate_pushdown,
            Rule::ProjectionPushdown => config.projection_pushdown,
            Rule::JoinReorder => config.join_reorder,
        }
    }

    fn apply(&self, plan: &LogicalPlan, catalog: &Catalog) -> LogicalPlan {
        match self {
            Rule::PredicatePushdown => predicate_pushdown(plan),
            Rule::ProjectionPushdown => projection_pushdown(plan),
            Rule::JoinReorder => join_reorder(plan, catalog),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Optimized {
    pub plan: QueryPlan,
    pub applied: Vec<&'static str>,
}

pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn rules(&self) -> Vec<Rule> {
        Rule::ALL
            .into_iter()
            .filter(|r| r.enabled(&self.config))
            .collect()
    }

    pub fn optimize(&self, plan: &QueryPlan, catalog: &Catalog) -> Result<Optimized, OptimizerError> {
        let signature = root_signature(&plan.root);
        let mut current = plan.root.clone();
        let mut applied = Vec::new();

        for rule in self.rules() {
            let (next, changed) = self.run_to_fixed_point(rule, current, &signature, catalog)?;
            if changed {
                debug!("{} rewrote plan:\n{}", rule.name(), pretty(&next));
                applied.push(rule.name());
            }
            current = next;
        }

        Ok(Optimized {
            plan: QueryPlan::new(current, plan.limit),
            applied,
        })
    }

    fn run_to_fixed_point(
        &self,
        rule: Rule,
        plan: LogicalPlan,
        signature: &[(ColumnRef, String)],
        catalog: &Catalog,
    ) -> Result<(LogicalPlan, bool), OptimizerError> {
        let mut current = plan;
        let mut changed = false;

        for pass in 1..=self.config.max_rule_passes {
            let next = rule.apply(&current, catalog);
            check_step(rule.name(), signature, &next)?;
            if next == current {
                return Ok((current, changed));
            }
            trace!("{} pass {pass} changed the plan", rule.name());
            changed = true;
            current = next;
        }

        warn!(
            "{} did not reach a fixed point within {} passes",
            rule.name(),
            self.config.max_rule_passes
        );
        Ok((current, changed))
    }
}

pub fn optimize(plan: &QueryPlan, catalog: &Catalog) -> Result<QueryPlan, OptimizerError> {
    Optimizer::new(OptimizerConfig::default())
        .optimize(plan, catalog)
        .map(|o| o.plan)
}

fn check_step(
    rule: &'static str,
    signature: &[(ColumnRef, String)],
    plan: &LogicalPlan,
) -> Result<(), OptimizerError> {
    validate(plan).map_err(|e| OptimizerError::invariant(rule, e))?;

    let now = root_signature(plan);
    if now != signature {
        return Err(OptimizerError::InvariantViolation {
            rule,
            reason: format!(
                "output changed from [{}] to [{}]",
                describe(signature),
                describe(&now)
            ),
        });
    }
    Ok(())
}

fn root_signature(plan: &LogicalPlan) -> Vec<(ColumnRef, String)> {
    match plan {
        LogicalPlan::Project(project) => plan
            .output_schema()
            .into_iter()
            .zip(project.exprs.iter().map(|(_, alias)| alias.clone()))
            .collect(),
        other => other
            .output_schema()
            .into_iter()
            .map(|c| {
                let name = c.to_string();
                (c, name)
            })
            .collect(),
    }
}

fn describe(signature: &[(ColumnRef, String)]) -> String {
    signature
        .iter()
        .map(|(_, name)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
