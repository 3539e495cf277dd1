use std::collections::BTreeMap;

use serde::Serialize;

use crate::ir::plan::LogicalPlan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanTree {
    pub operator: String,
    pub label: String,
    pub params: BTreeMap<String, String>,
    pub children: Vec<PlanTree>,
}

impl PlanTree {
    pub fn new(operator: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            label: label.into(),
            params: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn child(mut self, child: PlanTree) -> Self {
        self.children.push(child);
        self
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }
}

impl From<&LogicalPlan> for PlanTree {
    fn from(plan: &LogicalPlan) -> Self {
        match plan {
            LogicalPlan::Scan(scan) => PlanTree::new("Scan", format!("Scan {}", scan.table))
                .param("table", scan.table.clone())
                .param("columns", scan.columns.join(", ")),
            LogicalPlan::Select(select) => PlanTree::new(
                "Select",
                format!("Select ({})", select.predicate),
            )
            .param("predicate", select.predicate.to_string())
            .child(PlanTree::from(select.input.as_ref())),
            LogicalPlan::Project(project) => {
                let fields = project
                    .exprs
                    .iter()
                    .map(|(_, alias)| alias.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                PlanTree::new("Project", format!("Project [{fields}]"))
                    .param("columns", fields)
                    .child(PlanTree::from(project.input.as_ref()))
            }
            LogicalPlan::Join(join) => {
                let predicate = join
                    .on
                    .as_ref()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "cross".to_string());
                PlanTree::new("Join", format!("Join ({predicate})"))
                    .param("predicate", predicate)
                    .child(PlanTree::from(join.left.as_ref()))
                    .child(PlanTree::from(join.right.as_ref()))
            }
        }
    }
}
