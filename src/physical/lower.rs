use log::debug;

use crate::ir::expr::{ColumnRef, Expr};
use crate::ir::plan::{LogicalPlan, QueryPlan};
use crate::ir::validate::SchemaError;
use crate::physical::plan::{PhysicalNode, PhysicalPlan};

/// Maps each logical operator onto its single physical strategy and resolves
/// column references to row positions.
pub fn lower(plan: &QueryPlan) -> Result<PhysicalPlan, SchemaError> {
    let root = lower_node(&plan.root)?;
    let columns = match &plan.root {
        LogicalPlan::Project(project) => project.exprs.iter().map(|(_, a)| a.clone()).collect(),
        other => other.output_schema().iter().map(|c| c.to_string()).collect(),
    };
    debug!("lowered plan with root {}", root.label());

    Ok(PhysicalPlan {
        root,
        limit: plan.limit,
        columns,
    })
}

fn lower_node(plan: &LogicalPlan) -> Result<PhysicalNode, SchemaError> {
    Ok(match plan {
        LogicalPlan::Scan(scan) => PhysicalNode::SeqScan {
            table: scan.table.clone(),
            schema: plan
                .output_schema()
                .iter()
                .enumerate()
                .map(|(i, c)| c.resolved(i))
                .collect(),
        },
        LogicalPlan::Join(join) => {
            let left = lower_node(&join.left)?;
            let right = lower_node(&join.right)?;
            let mut schema = left.schema();
            schema.extend(right.schema());
            let predicate = join
                .on
                .as_ref()
                .map(|on| resolve(on, &schema, "Join"))
                .transpose()?;
            PhysicalNode::NestedLoopJoin {
                left: Box::new(left),
                right: Box::new(right),
                predicate,
            }
        }
        LogicalPlan::Select(select) => {
            let input = lower_node(&select.input)?;
            let predicate = resolve(&select.predicate, &input.schema(), "Select")?;
            PhysicalNode::Filter {
                input: Box::new(input),
                predicate,
            }
        }
        LogicalPlan::Project(project) => {
            let input = lower_node(&project.input)?;
            let schema = input.schema();
            let exprs = project
                .exprs
                .iter()
                .map(|(e, alias)| {
                    Ok::<_, SchemaError>((resolve(e, &schema, "Project")?, alias.clone()))
                })
                .collect::<Result<Vec<_>, SchemaError>>()?;
            PhysicalNode::Project {
                input: Box::new(input),
                exprs,
            }
        }
    })
}

fn resolve(expr: &Expr, schema: &[ColumnRef], operator: &'static str) -> Result<Expr, SchemaError> {
    expr.map_columns(&mut |col: &ColumnRef| {
        schema
            .iter()
            .position(|c| c.same_column(col))
            .map(|i| col.resolved(i))
            .ok_or_else(|| SchemaError::UnknownColumn {
                column: col.to_string(),
                operator,
            })
    })
}
