use crate::ir::expr::{ColumnRef, Expr, conjoin};
use crate::ir::plan::{Join, LogicalPlan, Project, Select};

/// Moves filter clauses as close to the scans as their columns allow.
///
/// Conjunctions are split on `AND` only. A clause covered by one join side is
/// pushed into that side, a clause spanning both sides is merged into the join
/// predicate. Adjacent selects are merged.
pub fn predicate_pushdown(plan: &LogicalPlan) -> LogicalPlan {
    push_down(plan, Vec::new())
}

fn push_down(plan: &LogicalPlan, mut clauses: Vec<Expr>) -> LogicalPlan {
    match plan {
        LogicalPlan::Scan(_) => wrap(plan.clone(), clauses),

        LogicalPlan::Select(select) => {
            clauses.extend(select.predicate.clone().split_conjunction());
            push_down(&select.input, clauses)
        }

        LogicalPlan::Project(project) => {
            // Filters stay above a narrowing projection over a scan.
            let narrowing =
                project.is_pure() && matches!(project.input.as_ref(), LogicalPlan::Scan(_));
            let input_schema = project.input.output_schema();
            let (below, above): (Vec<_>, Vec<_>) = clauses
                .into_iter()
                .partition(|clause| !narrowing && covers(&input_schema, clause));
            let rewritten = LogicalPlan::Project(Project {
                input: Box::new(push_down(&project.input, below)),
                exprs: project.exprs.clone(),
            });
            wrap(rewritten, above)
        }

        LogicalPlan::Join(join) => push_into_join(join, clauses),
    }
}

fn push_into_join(join: &Join, clauses: Vec<Expr>) -> LogicalPlan {
    let left_schema = join.left.output_schema();
    let right_schema = join.right.output_schema();

    let mut all = join
        .on
        .clone()
        .map(Expr::split_conjunction)
        .unwrap_or_default();
    all.extend(clauses);

    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut both = Vec::new();
    for clause in all {
        if covers(&left_schema, &clause) {
            left.push(clause);
        } else if covers(&right_schema, &clause) {
            right.push(clause);
        } else {
            both.push(clause);
        }
    }

    LogicalPlan::Join(Join {
        left: Box::new(push_down(&join.left, left)),
        right: Box::new(push_down(&join.right, right)),
        on: conjoin(both),
    })
}

/// True when every column of `clause` is produced by `schema`. Literal-only
/// clauses are covered by anything.
fn covers(schema: &[ColumnRef], clause: &Expr) -> bool {
    clause
        .columns()
        .iter()
        .all(|col| schema.iter().any(|c| c.same_column(col)))
}

fn wrap(plan: LogicalPlan, clauses: Vec<Expr>) -> LogicalPlan {
    match conjoin(clauses) {
        Some(predicate) => LogicalPlan::Select(Select {
            input: Box::new(plan),
            predicate,
        }),
        None => plan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::BinaryOp;
    use crate::ir::pretty::pretty;

    fn users() -> LogicalPlan {
        LogicalPlan::scan("users", vec!["id".into(), "name".into(), "age".into()])
    }

    fn orders() -> LogicalPlan {
        LogicalPlan::scan("orders", vec!["id".into(), "user_id".into(), "amount".into()])
    }

    fn join_on() -> Expr {
        Expr::bin(
            Expr::col("users", "id"),
            BinaryOp::Eq,
            Expr::col("orders", "user_id"),
        )
    }

    fn cmp(table: &str, col: &str, op: BinaryOp, v: i64) -> Expr {
        Expr::bin(Expr::col(table, col), op, Expr::lit(v))
    }

    #[test]
    fn pushes_single_side_clause_below_join() {
        let plan = users()
            .join(orders(), Some(join_on()))
            .select(cmp("users", "age", BinaryOp::Gt, 25))
            .project(vec![(Expr::col("users", "name"), "name")]);

        let optimized = predicate_pushdown(&plan);

        let expected = r#"
Project [name]
└─ Join (users.id = orders.user_id)
   ├─ Select (users.age > 25)
   │  └─ Scan users
   └─ Scan orders
"#;

        assert_eq!(pretty(&optimized).trim(), expected.trim());
    }

    #[test]
    fn splits_conjunction_across_sides() {
        let predicate = cmp("users", "age", BinaryOp::Gt, 25)
            .and(cmp("orders", "amount", BinaryOp::Lt, 80))
            .and(Expr::bin(
                Expr::col("users", "id"),
                BinaryOp::Lt,
                Expr::col("orders", "id"),
            ));
        let plan = users().join(orders(), Some(join_on())).select(predicate);

        let optimized = predicate_pushdown(&plan);

        let expected = r#"
Join (users.id = orders.user_id AND users.id < orders.id)
├─ Select (users.age > 25)
│  └─ Scan users
└─ Select (orders.amount < 80)
   └─ Scan orders
"#;

        assert_eq!(pretty(&optimized).trim(), expected.trim());
    }

    #[test]
    fn or_clause_is_atomic() {
        let single_side = cmp("users", "age", BinaryOp::Gt, 25).or(cmp("users", "id", BinaryOp::Eq, 1));
        let cross = cmp("users", "age", BinaryOp::Gt, 25).or(cmp("orders", "amount", BinaryOp::Gt, 10));
        let plan = users()
            .join(orders(), Some(join_on()))
            .select(single_side.and(cross));

        let optimized = predicate_pushdown(&plan);

        let expected = r#"
Join (users.id = orders.user_id AND (users.age > 25 OR orders.amount > 10))
├─ Select (users.age > 25 OR users.id = 1)
│  └─ Scan users
└─ Scan orders
"#;

        assert_eq!(pretty(&optimized).trim(), expected.trim());
    }

    #[test]
    fn recurses_through_nested_joins() {
        let items = LogicalPlan::scan("items", vec!["order_id".into(), "qty".into()]);
        let plan = users()
            .join(orders(), Some(join_on()))
            .join(
                items,
                Some(Expr::bin(
                    Expr::col("orders", "id"),
                    BinaryOp::Eq,
                    Expr::col("items", "order_id"),
                )),
            )
            .select(cmp("orders", "amount", BinaryOp::Ge, 50).and(cmp("items", "qty", BinaryOp::Gt, 1)));

        let optimized = predicate_pushdown(&plan);

        let expected = r#"
Join (orders.id = items.order_id)
├─ Join (users.id = orders.user_id)
│  ├─ Scan users
│  └─ Select (orders.amount >= 50)
│     └─ Scan orders
└─ Select (items.qty > 1)
   └─ Scan items
"#;

        assert_eq!(pretty(&optimized).trim(), expected.trim());
    }

    #[test]
    fn merges_stacked_selects_over_scan() {
        let plan = users()
            .select(cmp("users", "age", BinaryOp::Gt, 1))
            .select(cmp("users", "id", BinaryOp::Lt, 9));

        let optimized = predicate_pushdown(&plan);

        assert_eq!(
            pretty(&optimized).trim(),
            "Select (users.id < 9 AND users.age > 1)\n└─ Scan users"
        );
    }

    #[test]
    fn keeps_clause_on_computed_column_above_project() {
        let computed = Expr::bin(Expr::col("users", "age"), BinaryOp::Add, Expr::lit(1));
        let plan = users()
            .project(vec![
                (Expr::col("users", "id"), "id".to_string()),
                (computed, "age_plus_1".to_string()),
            ])
            .select(
                Expr::bin(
                    Expr::Column(ColumnRef::unqualified("age_plus_1")),
                    BinaryOp::Gt,
                    Expr::lit(2),
                )
                .and(cmp("users", "id", BinaryOp::Eq, 1)),
            );

        let optimized = predicate_pushdown(&plan);

        let expected = r#"
Select (age_plus_1 > 2)
└─ Project [id, age_plus_1]
   └─ Select (users.id = 1)
      └─ Scan users
"#;
        assert_eq!(pretty(&optimized).trim(), expected.trim());
    }

    #[test]
    fn filter_stays_above_narrowing_project() {
        let plan = users()
            .project(vec![
                (Expr::col("users", "id"), "users.id"),
                (Expr::col("users", "age"), "users.age"),
            ])
            .select(cmp("users", "age", BinaryOp::Gt, 25))
            .join(orders(), Some(join_on()));

        assert_eq!(predicate_pushdown(&plan), plan);
    }

    #[test]
    fn reaches_fixed_point_after_one_pass() {
        let plan = users()
            .join(orders(), Some(join_on()))
            .select(cmp("users", "age", BinaryOp::Gt, 25).and(cmp("orders", "amount", BinaryOp::Gt, 5)));

        let once = predicate_pushdown(&plan);
        let twice = predicate_pushdown(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn preserves_non_pushable_structure() {
        let plan = users();

        assert_eq!(predicate_pushdown(&plan), plan);
    }
}
