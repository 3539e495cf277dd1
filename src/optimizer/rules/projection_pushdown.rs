use std::collections::BTreeSet;

use crate::ir::expr::{ColumnRef, Expr};
use crate::ir::plan::{Join, LogicalPlan, Project, Select};

type Required = BTreeSet<ColumnRef>;

/// Narrows every join input to the columns still needed above it.
///
/// A `Project` is placed directly above each scan under a join and above each
/// sub-join that emits more than its parent needs. The root projection is
/// never narrowed, and plans without joins are returned unchanged.
pub fn projection_pushdown(plan: &LogicalPlan) -> LogicalPlan {
    if plan.count_nodes(&|p| matches!(p, LogicalPlan::Join(_))) == 0 {
        return plan.clone();
    }

    match plan {
        LogicalPlan::Project(project) => {
            let required = columns_of(project.exprs.iter().map(|(e, _)| e));
            LogicalPlan::Project(Project {
                input: Box::new(prune(&project.input, &required, false)),
                exprs: project.exprs.clone(),
            })
        }
        other => {
            let required: Required = other.output_schema().into_iter().collect();
            prune(other, &required, false)
        }
    }
}

fn prune(plan: &LogicalPlan, required: &Required, under_join: bool) -> LogicalPlan {
    match plan {
        LogicalPlan::Scan(_) => {
            if under_join {
                narrow(plan.clone(), required)
            } else {
                plan.clone()
            }
        }

        LogicalPlan::Select(select) => {
            let mut below = required.clone();
            select.predicate.collect_columns(&mut below);
            LogicalPlan::Select(Select {
                input: Box::new(prune(&select.input, &below, under_join)),
                predicate: select.predicate.clone(),
            })
        }

        LogicalPlan::Project(project) => prune_project(project, required, under_join),

        LogicalPlan::Join(join) => prune_join(join, required),
    }
}

fn prune_join(join: &Join, required: &Required) -> LogicalPlan {
    let mut needed = required.clone();
    if let Some(on) = &join.on {
        on.collect_columns(&mut needed);
    }

    let side = |child: &LogicalPlan| {
        let side_needed: Required = child
            .output_schema()
            .into_iter()
            .filter(|c| needed.contains(c))
            .collect();
        match prune(child, &side_needed, true) {
            sub @ LogicalPlan::Join(_) => narrow(sub, &side_needed),
            other => other,
        }
    };

    LogicalPlan::Join(Join {
        left: Box::new(side(&join.left)),
        right: Box::new(side(&join.right)),
        on: join.on.clone(),
    })
}

fn prune_project(project: &Project, required: &Required, under_join: bool) -> LogicalPlan {
    let mut kept: Vec<(Expr, String)> = project
        .exprs
        .iter()
        .filter(|(expr, alias)| required.contains(&output_column(expr, alias)))
        .cloned()
        .collect();
    if kept.is_empty() {
        kept.extend(project.exprs.first().cloned());
    }

    let below = columns_of(kept.iter().map(|(e, _)| e));
    let input = prune(&project.input, &below, under_join);

    let pure = kept.iter().all(|(e, _)| e.as_column().is_some());
    if !pure {
        return LogicalPlan::Project(Project {
            input: Box::new(input),
            exprs: kept,
        });
    }

    // Collapse nested column-only projections.
    let input = match input {
        LogicalPlan::Project(inner) if inner.is_pure() => *inner.input,
        other => other,
    };

    let identity = kept
        .iter()
        .map(|(e, alias)| output_column(e, alias))
        .eq(input.output_schema());
    if identity {
        input
    } else {
        LogicalPlan::Project(Project {
            input: Box::new(input),
            exprs: kept,
        })
    }
}

fn narrow(plan: LogicalPlan, required: &Required) -> LogicalPlan {
    let schema = plan.output_schema();
    let mut keep: Vec<ColumnRef> = schema
        .iter()
        .filter(|c| required.contains(c))
        .cloned()
        .collect();
    if keep.len() == schema.len() {
        return plan;
    }
    if keep.is_empty() {
        keep.extend(schema.first().cloned());
    }

    plan.project(
        keep.into_iter()
            .map(|c| {
                let alias = c.to_string();
                (Expr::Column(c), alias)
            })
            .collect(),
    )
}

fn output_column(expr: &Expr, alias: &str) -> ColumnRef {
    match expr {
        Expr::Column(c) => c.unresolved(),
        _ => ColumnRef::unqualified(alias),
    }
}

fn columns_of<'e>(exprs: impl Iterator<Item = &'e Expr>) -> Required {
    let mut out = Required::new();
    for expr in exprs {
        expr.collect_columns(&mut out);
    }
    out
}
