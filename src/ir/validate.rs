use std::fmt;

use crate::ir::expr::{ColumnRef, Expr};
use crate::ir::plan::LogicalPlan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// An operator references a column its input does not produce.
    UnknownColumn {
        column: String,
        operator: &'static str,
    },
    EmptyProject,
    /// Both sides of a join produce the same qualified column.
    DuplicateColumn { column: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnknownColumn { column, operator } => {
                write!(f, "{operator} references column {column} not produced by its input")
            }
            SchemaError::EmptyProject => write!(f, "projection produces no columns"),
            SchemaError::DuplicateColumn { column } => {
                write!(f, "join inputs both produce column {column}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

pub fn validate(plan: &LogicalPlan) -> Result<(), SchemaError> {
    match plan {
        LogicalPlan::Scan(_) => Ok(()),
        LogicalPlan::Select(select) => {
            validate(&select.input)?;
            check_expr(&select.predicate, &select.input.output_schema(), "Select")
        }
        LogicalPlan::Project(project) => {
            validate(&project.input)?;
            if project.exprs.is_empty() {
                return Err(SchemaError::EmptyProject);
            }
            let input = project.input.output_schema();
            for (expr, _) in &project.exprs {
                check_expr(expr, &input, "Project")?;
            }
            Ok(())
        }
        LogicalPlan::Join(join) => {
            validate(&join.left)?;
            validate(&join.right)?;
            let left = join.left.output_schema();
            let right = join.right.output_schema();
            if let Some(dup) = right.iter().find(|c| left.contains(c)) {
                return Err(SchemaError::DuplicateColumn {
                    column: dup.to_string(),
                });
            }
            match &join.on {
                Some(on) => {
                    let mut both = left;
                    both.extend(right);
                    check_expr(on, &both, "Join")
                }
                None => Ok(()),
            }
        }
    }
}

fn check_expr(
    expr: &Expr,
    available: &[ColumnRef],
    operator: &'static str,
) -> Result<(), SchemaError> {
    for col in expr.columns() {
        if !available.iter().any(|c| c.same_column(&col)) {
            return Err(SchemaError::UnknownColumn {
                column: col.to_string(),
                operator,
            });
        }
    }
    Ok(())
}
