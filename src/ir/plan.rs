use crate::ir::expr::{ColumnRef, Expr};

#[derive(Clone, Debug, PartialEq)]
pub enum LogicalPlan {
    Scan(Scan),
    Join(Join),
    Select(Select),
    Project(Project),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scan {
    pub table: String,
    /// Full column list of the base table, in catalog order.
    pub columns: Vec<String>,
}

/// Inner join. `on == None` is a cross product.
#[derive(Clone, Debug, PartialEq)]
pub struct Join {
    pub left: Box<LogicalPlan>,
    pub right: Box<LogicalPlan>,
    pub on: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    pub input: Box<LogicalPlan>,
    pub predicate: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub input: Box<LogicalPlan>,
    pub exprs: Vec<(Expr, String)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryPlan {
    pub root: LogicalPlan,
    pub limit: Option<usize>,
}

impl LogicalPlan {
    pub fn scan(table: impl Into<String>, columns: Vec<String>) -> Self {
        LogicalPlan::Scan(Scan {
            table: table.into(),
            columns,
        })
    }

    pub fn select(self, predicate: Expr) -> Self {
        LogicalPlan::Select(Select {
            input: Box::new(self),
            predicate,
        })
    }

    pub fn project(self, exprs: Vec<(Expr, impl Into<String>)>) -> Self {
        LogicalPlan::Project(Project {
            input: Box::new(self),
            exprs: exprs.into_iter().map(|(e, a)| (e, a.into())).collect(),
        })
    }

    pub fn join(self, right: LogicalPlan, on: Option<Expr>) -> Self {
        LogicalPlan::Join(Join {
            left: Box::new(self),
            right: Box::new(right),
            on,
        })
    }

    pub fn output_schema(&self) -> Vec<ColumnRef> {
        match self {
            LogicalPlan::Scan(scan) => scan
                .columns
                .iter()
                .map(|c| ColumnRef::qualified(scan.table.clone(), c.clone()))
                .collect(),
            LogicalPlan::Join(join) => {
                let mut cols = join.left.output_schema();
                cols.extend(join.right.output_schema());
                cols
            }
            LogicalPlan::Select(select) => select.input.output_schema(),
            LogicalPlan::Project(project) => project
                .exprs
                .iter()
                .map(|(expr, alias)| match expr {
                    Expr::Column(c) => c.unresolved(),
                    _ => ColumnRef::unqualified(alias.clone()),
                })
                .collect(),
        }
    }

    pub fn base_tables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_tables(&mut out);
        out
    }

    fn collect_tables(&self, out: &mut Vec<String>) {
        match self {
            LogicalPlan::Scan(scan) => out.push(scan.table.clone()),
            LogicalPlan::Join(join) => {
                join.left.collect_tables(out);
                join.right.collect_tables(out);
            }
            LogicalPlan::Select(select) => select.input.collect_tables(out),
            LogicalPlan::Project(project) => project.input.collect_tables(out),
        }
    }

    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::Scan(_) => vec![],
            LogicalPlan::Join(join) => vec![join.left.as_ref(), join.right.as_ref()],
            LogicalPlan::Select(select) => vec![select.input.as_ref()],
            LogicalPlan::Project(project) => vec![project.input.as_ref()],
        }
    }

    pub fn count_nodes(&self, pred: &impl Fn(&LogicalPlan) -> bool) -> usize {
        let own = usize::from(pred(self));
        own + self
            .children()
            .into_iter()
            .map(|c| c.count_nodes(pred))
            .sum::<usize>()
    }
}

impl Project {
    pub fn is_pure(&self) -> bool {
        self.exprs.iter().all(|(e, _)| matches!(e, Expr::Column(_)))
    }
}

impl QueryPlan {
    pub fn new(root: LogicalPlan, limit: Option<usize>) -> Self {
        Self { root, limit }
    }

    pub fn output_schema(&self) -> Vec<ColumnRef> {
        self.root.output_schema()
    }
}
