use std::fmt;

use serde::Serialize;

use crate::ir::expr::{ColumnRef, Expr};
use crate::ir::tree::PlanTree;

/// How an operator is carried out. One strategy exists per operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    SequentialScan,
    NestedLoopJoin,
    IterativeFilter,
    EvaluateProject,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::SequentialScan => "sequential_scan",
            Strategy::NestedLoopJoin => "nested_loop_join",
            Strategy::IterativeFilter => "iterative_filter",
            Strategy::EvaluateProject => "evaluate_project",
        };
        write!(f, "{s}")
    }
}

/// Executable operator tree. Column references carry resolved positions;
/// no node holds catalog data.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalNode {
    SeqScan {
        table: String,
        schema: Vec<ColumnRef>,
    },
    NestedLoopJoin {
        left: Box<PhysicalNode>,
        right: Box<PhysicalNode>,
        predicate: Option<Expr>,
    },
    Filter {
        input: Box<PhysicalNode>,
        predicate: Expr,
    },
    Project {
        input: Box<PhysicalNode>,
        exprs: Vec<(Expr, String)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalPlan {
    pub root: PhysicalNode,
    pub limit: Option<usize>,
    pub columns: Vec<String>,
}

impl PhysicalNode {
    pub fn strategy(&self) -> Strategy {
        match self {
            PhysicalNode::SeqScan { .. } => Strategy::SequentialScan,
            PhysicalNode::NestedLoopJoin { .. } => Strategy::NestedLoopJoin,
            PhysicalNode::Filter { .. } => Strategy::IterativeFilter,
            PhysicalNode::Project { .. } => Strategy::EvaluateProject,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PhysicalNode::SeqScan { .. } => "Scan",
            PhysicalNode::NestedLoopJoin { .. } => "Join",
            PhysicalNode::Filter { .. } => "Select",
            PhysicalNode::Project { .. } => "Project",
        }
    }

    pub fn label(&self) -> String {
        match self {
            PhysicalNode::SeqScan { table, .. } => format!("SeqScan {table}"),
            PhysicalNode::NestedLoopJoin { predicate, .. } => match predicate {
                Some(p) => format!("NestedLoopJoin ({p})"),
                None => "NestedLoopJoin (cross)".to_string(),
            },
            PhysicalNode::Filter { predicate, .. } => format!("Filter ({predicate})"),
            PhysicalNode::Project { exprs, .. } => {
                let fields = exprs
                    .iter()
                    .map(|(_, alias)| alias.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Project [{fields}]")
            }
        }
    }

    pub fn schema(&self) -> Vec<ColumnRef> {
        match self {
            PhysicalNode::SeqScan { schema, .. } => schema.clone(),
            PhysicalNode::NestedLoopJoin { left, right, .. } => {
                let mut cols = left.schema();
                cols.extend(right.schema());
                cols
            }
            PhysicalNode::Filter { input, .. } => input.schema(),
            PhysicalNode::Project { exprs, .. } => exprs
                .iter()
                .map(|(e, alias)| match e {
                    Expr::Column(c) => c.unresolved(),
                    _ => ColumnRef::unqualified(alias.clone()),
                })
                .collect(),
        }
    }

    pub fn children(&self) -> Vec<&PhysicalNode> {
        match self {
            PhysicalNode::SeqScan { .. } => vec![],
            PhysicalNode::NestedLoopJoin { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            PhysicalNode::Filter { input, .. } | PhysicalNode::Project { input, .. } => {
                vec![input.as_ref()]
            }
        }
    }
}

impl From<&PhysicalNode> for PlanTree {
    fn from(node: &PhysicalNode) -> Self {
        let mut tree =
            PlanTree::new(node.kind(), node.label()).param("strategy", node.strategy().to_string());
        tree = match node {
            PhysicalNode::SeqScan { table, schema } => tree.param("table", table.clone()).param(
                "columns",
                schema
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            PhysicalNode::NestedLoopJoin { predicate, .. } => tree.param(
                "predicate",
                predicate
                    .as_ref()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "cross".to_string()),
            ),
            PhysicalNode::Filter { predicate, .. } => tree.param("predicate", predicate.to_string()),
            PhysicalNode::Project { exprs, .. } => tree.param(
                "columns",
                exprs
                    .iter()
                    .map(|(_, a)| a.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        };
        for child in node.children() {
            tree = tree.child(PlanTree::from(child));
        }
        tree
    }
}

impl From<&PhysicalPlan> for PlanTree {
    fn from(plan: &PhysicalPlan) -> Self {
        let tree = PlanTree::from(&plan.root);
        match plan.limit {
            Some(n) => tree.param("limit", n.to_string()),
            None => tree,
        }
    }
}

pub fn pretty(plan: &PhysicalPlan) -> String {
    let mut out = crate::ir::pretty::render(&PlanTree::from(&plan.root));
    if let Some(n) = plan.limit {
        out.push_str(&format!("(limit {n})\n"));
    }
    out
}
