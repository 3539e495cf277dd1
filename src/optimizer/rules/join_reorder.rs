use log::trace;

use crate::catalog::Catalog;
use crate::ir::expr::{ColumnRef, Expr, conjoin};
use crate::ir::plan::{Join, LogicalPlan, Project, Select};
use crate::optimizer::rules::projection_pushdown::projection_pushdown;

/// Re-nests each join chain left-deep, smallest relations first.
///
/// A leaf's estimate is the product of the catalog row counts of the tables it
/// scans, and leaves are ordered by estimate alone with ties in source order.
/// Predicates attach to the first join that produces all their columns, so
/// two adjacent leaves without a shared predicate meet in a cross product.
pub fn join_reorder(plan: &LogicalPlan, catalog: &Catalog) -> LogicalPlan {
    let mut looked_through = false;
    let mut rewritten = reorder(plan, catalog, &mut looked_through);

    // Projections dropped while flattening, or made stale by the new order,
    // are derived again.
    if looked_through || rewritten != *plan {
        rewritten = projection_pushdown(&rewritten);
    }

    let original = plan.output_schema();
    if rewritten.output_schema() == original {
        return rewritten;
    }
    rewritten.project(
        original
            .into_iter()
            .map(|c| {
                let alias = c.to_string();
                (Expr::Column(c), alias)
            })
            .collect(),
    )
}

fn reorder(plan: &LogicalPlan, catalog: &Catalog, looked_through: &mut bool) -> LogicalPlan {
    match plan {
        LogicalPlan::Scan(_) => plan.clone(),
        LogicalPlan::Select(select) => LogicalPlan::Select(Select {
            input: Box::new(reorder(&select.input, catalog, looked_through)),
            predicate: select.predicate.clone(),
        }),
        LogicalPlan::Project(project) => LogicalPlan::Project(Project {
            input: Box::new(reorder(&project.input, catalog, looked_through)),
            exprs: project.exprs.clone(),
        }),
        LogicalPlan::Join(_) => reorder_chain(plan, catalog, looked_through),
    }
}

fn reorder_chain(plan: &LogicalPlan, catalog: &Catalog, looked_through: &mut bool) -> LogicalPlan {
    let mut leaves = Vec::new();
    let mut predicates = Vec::new();
    flatten(plan, &mut leaves, &mut predicates, looked_through);

    let leaves: Vec<LogicalPlan> = leaves
        .into_iter()
        .map(|leaf| reorder(leaf, catalog, looked_through))
        .collect();
    let estimates: Vec<usize> = leaves.iter().map(|l| estimate(l, catalog)).collect();
    let order = size_order(&estimates);

    trace!(
        "join order {:?} for estimates {:?}",
        order
            .iter()
            .map(|&i| leaves[i].base_tables().join("+"))
            .collect::<Vec<_>>(),
        estimates
    );

    let ordered: Vec<LogicalPlan> = order.iter().map(|&i| leaves[i].clone()).collect();
    let Some((first, rest)) = ordered.split_first() else {
        return plan.clone();
    };

    let mut pending = predicates;
    let mut tree = first.clone();
    for leaf in rest {
        let mut available = tree.output_schema();
        available.extend(leaf.output_schema());
        let (attach, keep): (Vec<_>, Vec<_>) =
            pending.into_iter().partition(|p| covers(&available, p));
        pending = keep;
        tree = LogicalPlan::Join(Join {
            left: Box::new(tree),
            right: Box::new(leaf.clone()),
            on: conjoin(attach),
        });
    }

    // Predicates no join could host stay above the chain.
    match conjoin(pending) {
        Some(residual) => tree.select(residual),
        None => tree,
    }
}

/// Collects the leaves and predicates of a maximal join chain, looking through
/// column-only projections that sit on sub-joins.
fn flatten<'p>(
    plan: &'p LogicalPlan,
    leaves: &mut Vec<&'p LogicalPlan>,
    predicates: &mut Vec<Expr>,
    looked_through: &mut bool,
) {
    match plan {
        LogicalPlan::Join(join) => {
            flatten(&join.left, leaves, predicates, looked_through);
            flatten(&join.right, leaves, predicates, looked_through);
            if let Some(on) = &join.on {
                predicates.extend(on.clone().split_conjunction());
            }
        }
        LogicalPlan::Project(project)
            if project.is_pure() && matches!(project.input.as_ref(), LogicalPlan::Join(_)) =>
        {
            *looked_through = true;
            flatten(&project.input, leaves, predicates, looked_through);
        }
        other => leaves.push(other),
    }
}

fn estimate(leaf: &LogicalPlan, catalog: &Catalog) -> usize {
    leaf.base_tables()
        .iter()
        .map(|t| catalog.row_count(t).unwrap_or(0))
        .fold(1usize, usize::saturating_mul)
}

fn size_order(estimates: &[usize]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..estimates.len()).collect();
    order.sort_by_key(|&i| (estimates[i], i));
    order
}

fn covers(schema: &[ColumnRef], clause: &Expr) -> bool {
    clause
        .columns()
        .iter()
        .all(|col| schema.iter().any(|c| c.same_column(col)))
}
