//! Logical planner.
//!
//! Resolves names against the catalog and builds the canonical unoptimized
//! tree: scans folded into left-deep joins in source order, one `Select` for
//! the WHERE clause, one `Project` on top.

use log::debug;

use crate::catalog::{Catalog, Table};
use crate::frontend::sql::ast::{self, CompareOp, LogicalOp, Projection, SelectItem, SelectStmt};
use crate::ir::expr::{BinaryOp, ColumnRef, Expr};
use crate::ir::plan::{LogicalPlan, QueryPlan};
use crate::planner::errors::PlanError;

pub struct LogicalPlanner<'a> {
    catalog: &'a Catalog,
}

impl<'a> LogicalPlanner<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn plan(&self, stmt: &SelectStmt) -> Result<QueryPlan, PlanError> {
        let tables = self.resolve_tables(stmt)?;

        // FROM / JOIN
        let mut plan = scan(tables[0]);
        for (i, join) in stmt.joins.iter().enumerate() {
            let scope = Scope::new(&tables[..i + 2]);
            let left = scope.resolve(&join.left)?;
            let right = scope.resolve(&join.right)?;
            let on = Expr::bin(Expr::Column(left), BinaryOp::Eq, Expr::Column(right));
            plan = plan.join(scan(tables[i + 1]), Some(on));
        }

        let scope = Scope::new(&tables);

        // WHERE
        if let Some(predicate) = &stmt.selection {
            plan = plan.select(scope.lower_expr(predicate)?);
        }

        // SELECT list
        let exprs = match &stmt.projection {
            Projection::Wildcard => scope.expand_wildcard(),
            Projection::Items(items) => items
                .iter()
                .map(|item| scope.lower_item(item))
                .collect::<Result<Vec<_>, _>>()?,
        };
        plan = plan.project(exprs);

        debug!(
            "planned query over {} table(s), limit {:?}",
            tables.len(),
            stmt.limit
        );

        Ok(QueryPlan::new(plan, stmt.limit))
    }

    fn resolve_tables(&self, stmt: &SelectStmt) -> Result<Vec<&'a Table>, PlanError> {
        let mut tables: Vec<&'a Table> = Vec::with_capacity(stmt.joins.len() + 1);
        let refs = std::iter::once(&stmt.from).chain(stmt.joins.iter().map(|j| &j.table));

        for table_ref in refs {
            let table =
                self.catalog
                    .get_table(&table_ref.name)
                    .ok_or_else(|| PlanError::UnknownTable {
                        name: table_ref.name.clone(),
                        position: table_ref.position,
                    })?;
            if tables.iter().any(|t| t.name == table.name) {
                return Err(PlanError::DuplicateTable {
                    name: table.name.clone(),
                    position: table_ref.position,
                });
            }
            tables.push(table);
        }

        Ok(tables)
    }
}

fn scan(table: &Table) -> LogicalPlan {
    LogicalPlan::scan(table.name.clone(), table.column_names())
}

struct Scope<'s, 'a> {
    tables: &'s [&'a Table],
}

impl<'s, 'a> Scope<'s, 'a> {
    fn new(tables: &'s [&'a Table]) -> Self {
        Self { tables }
    }

    fn resolve(&self, col: &ast::ColumnRef) -> Result<ColumnRef, PlanError> {
        match &col.table {
            Some(qualifier) => {
                let table = self
                    .tables
                    .iter()
                    .find(|t| &t.name == qualifier)
                    .ok_or_else(|| PlanError::UnknownTable {
                        name: qualifier.clone(),
                        position: col.position,
                    })?;
                if !table.has_column(&col.name) {
                    return Err(PlanError::UnknownColumn {
                        name: col.display_name(),
                        position: col.position,
                    });
                }
                Ok(ColumnRef::qualified(table.name.clone(), col.name.clone()))
            }
            None => {
                let owners: Vec<&&Table> = self
                    .tables
                    .iter()
                    .filter(|t| t.has_column(&col.name))
                    .collect();
                match owners.as_slice() {
                    [] => Err(PlanError::UnknownColumn {
                        name: col.name.clone(),
                        position: col.position,
                    }),
                    [table] => Ok(ColumnRef::qualified(table.name.clone(), col.name.clone())),
                    many => Err(PlanError::AmbiguousColumn {
                        name: col.name.clone(),
                        tables: many.iter().map(|t| t.name.clone()).collect(),
                        position: col.position,
                    }),
                }
            }
        }
    }

    fn lower_expr(&self, expr: &ast::Expr) -> Result<Expr, PlanError> {
        Ok(match expr {
            ast::Expr::Column(c) => Expr::Column(self.resolve(c)?),
            ast::Expr::Literal(v) => Expr::Literal(v.clone()),
            ast::Expr::Comparison { left, op, right } => Expr::bin(
                self.lower_expr(left)?,
                compare_op(*op),
                self.lower_expr(right)?,
            ),
            ast::Expr::Logical { left, op, right } => {
                let op = match op {
                    LogicalOp::And => BinaryOp::And,
                    LogicalOp::Or => BinaryOp::Or,
                };
                Expr::bin(self.lower_expr(left)?, op, self.lower_expr(right)?)
            }
        })
    }

    fn lower_item(&self, item: &SelectItem) -> Result<(Expr, String), PlanError> {
        match item {
            SelectItem::Column(c) => Ok((Expr::Column(self.resolve(c)?), c.display_name())),
            SelectItem::Arithmetic {
                column,
                op,
                operand,
                text,
            } => {
                let resolved = self.resolve(column)?;
                let alias = format!("{}_{}_{}", column.name, op.word(), text.replace('.', "_"));
                let bin = match op {
                    ast::ArithOp::Add => BinaryOp::Add,
                    ast::ArithOp::Sub => BinaryOp::Sub,
                    ast::ArithOp::Mul => BinaryOp::Mul,
                    ast::ArithOp::Div => BinaryOp::Div,
                };
                Ok((
                    Expr::bin(Expr::Column(resolved), bin, Expr::Literal(operand.clone())),
                    alias,
                ))
            }
        }
    }

    /// `*` expands to every column of every table in source order. Output
    /// names stay bare for a single table and are qualified otherwise.
    fn expand_wildcard(&self) -> Vec<(Expr, String)> {
        let qualify = self.tables.len() > 1;
        self.tables
            .iter()
            .flat_map(|table| {
                table.column_names().into_iter().map(move |name| {
                    let alias = if qualify {
                        format!("{}.{}", table.name, name)
                    } else {
                        name.clone()
                    };
                    (Expr::col(table.name.clone(), name), alias)
                })
            })
            .collect()
    }
}

fn compare_op(op: CompareOp) -> BinaryOp {
    match op {
        CompareOp::Eq => BinaryOp::Eq,
        CompareOp::Neq => BinaryOp::Neq,
        CompareOp::Lt => BinaryOp::Lt,
        CompareOp::Lte => BinaryOp::Le,
        CompareOp::Gt => BinaryOp::Gt,
        CompareOp::Gte => BinaryOp::Ge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Table;
    use crate::common::types::DataType;
    use crate::common::value::Value;
    use crate::frontend::sql::parser::parse;
    use crate::ir::pretty::pretty;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .insert_table(
                Table::from_columns(
                    "users",
                    &[
                        ("id", DataType::Int64),
                        ("name", DataType::String),
                        ("age", DataType::Int64),
                    ],
                    vec![vec![Value::Int64(1), Value::from("A"), Value::Int64(30)]],
                )
                .unwrap(),
            )
            .unwrap();
        catalog
            .insert_table(
                Table::from_columns(
                    "orders",
                    &[
                        ("id", DataType::Int64),
                        ("user_id", DataType::Int64),
                        ("amount", DataType::Int64),
                    ],
                    vec![],
                )
                .unwrap(),
            )
            .unwrap();
        catalog
    }

    fn plan(sql: &str) -> Result<QueryPlan, PlanError> {
        let catalog = catalog();
        let stmt = parse(sql).unwrap();
        LogicalPlanner::new(&catalog).plan(&stmt)
    }

    #[test]
    fn canonical_join_shape() {
        let plan =
            plan("SELECT name FROM users JOIN orders ON users.id = orders.user_id WHERE age > 25 LIMIT 10")
                .unwrap();

        let expected = r#"
Project [name]
└─ Select (users.age > 25)
   └─ Join (users.id = orders.user_id)
      ├─ Scan users
      └─ Scan orders
"#;
        assert_eq!(pretty(&plan.root).trim(), expected.trim());
        assert_eq!(plan.limit, Some(10));
    }

    #[test]
    fn single_table_wildcard_uses_bare_names() {
        let plan = plan("SELECT * FROM users").unwrap();
        assert_eq!(pretty(&plan.root).lines().next(), Some("Project [id, name, age]"));
    }

    #[test]
    fn join_wildcard_qualifies_names() {
        let err = plan("SELECT * FROM users JOIN orders ON id = user_id");
        // `id` exists in both tables.
        assert!(matches!(err, Err(PlanError::AmbiguousColumn { .. })));

        let plan = plan_ok("SELECT * FROM users JOIN orders ON users.id = user_id");
        let schema: Vec<String> = plan.root.output_schema().iter().map(|c| c.to_string()).collect();
        assert_eq!(schema.len(), 6);
        assert!(pretty(&plan.root).starts_with("Project [users.id, users.name, users.age, orders.id"));
    }

    fn plan_ok(sql: &str) -> QueryPlan {
        plan(sql).unwrap()
    }

    #[test]
    fn arithmetic_item_alias() {
        let plan = plan_ok("SELECT age + 100, age * 1.5 FROM users");
        assert!(pretty(&plan.root).starts_with("Project [age_plus_100, age_times_1_5]"));
    }

    #[test]
    fn unknown_table_reports_name() {
        let err = plan("SELECT name FROM ghosts").unwrap_err();
        assert_eq!(err.name(), "ghosts");
        assert!(matches!(err, PlanError::UnknownTable { .. }));
    }

    #[test]
    fn unknown_column_reports_name() {
        let err = plan("SELECT salary FROM users").unwrap_err();
        assert_eq!(
            err,
            PlanError::UnknownColumn {
                name: "salary".into(),
                position: err.position(),
            }
        );
        assert_eq!(err.position().column, 8);
    }

    #[test]
    fn qualifier_must_be_in_scope() {
        let err = plan("SELECT name FROM users WHERE orders.amount > 1").unwrap_err();
        assert_eq!(err.name(), "orders");
    }

    #[test]
    fn on_clause_sees_only_joined_tables() {
        let catalog = {
            let mut c = catalog();
            c.insert_table(
                Table::from_columns("items", &[("order_id", DataType::Int64)], vec![]).unwrap(),
            )
            .unwrap();
            c
        };
        let stmt = parse(
            "SELECT name FROM users JOIN orders ON users.id = items.order_id JOIN items ON orders.id = items.order_id",
        )
        .unwrap();
        let err = LogicalPlanner::new(&catalog).plan(&stmt).unwrap_err();
        assert_eq!(err.name(), "items");
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let err = plan("SELECT name FROM users JOIN users ON users.id = users.id").unwrap_err();
        assert!(matches!(err, PlanError::DuplicateTable { .. }));
    }
}
