use crate::ir::plan::LogicalPlan;
use crate::ir::tree::PlanTree;

pub fn pretty(plan: &LogicalPlan) -> String {
    render(&PlanTree::from(plan))
}

pub fn render(tree: &PlanTree) -> String {
    let mut out = String::new();
    fmt_node(tree, "", true, true, &mut out);
    out
}

fn fmt_node(node: &PlanTree, prefix: &str, is_last: bool, is_root: bool, out: &mut String) {
    if is_root {
        out.push_str(&node.label);
        out.push('\n');
    } else {
        out.push_str(prefix);
        out.push_str(if is_last { "└─ " } else { "├─ " });
        out.push_str(&node.label);
        out.push('\n');
    }

    let child_prefix = if is_root {
        String::new()
    } else if is_last {
        format!("{prefix}   ")
    } else {
        format!("{prefix}│  ")
    };

    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        fmt_node(child, &child_prefix, i + 1 == count, false, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::{BinaryOp, Expr};

    fn users() -> LogicalPlan {
        LogicalPlan::scan("users", vec!["id".into(), "name".into(), "age".into()])
    }

    fn orders() -> LogicalPlan {
        LogicalPlan::scan("orders", vec!["id".into(), "user_id".into()])
    }

    #[test]
    fn pretty_print_scan() {
        let output = pretty(&users());

        assert_eq!(output.trim(), "Scan users");
    }

    #[test]
    fn pretty_print_project_chain() {
        let plan = users()
            .select(Expr::bin(
                Expr::col("users", "age"),
                BinaryOp::Gt,
                Expr::lit(25),
            ))
            .project(vec![(Expr::col("users", "name"), "name")]);

        let expected = r#"
Project [name]
└─ Select (users.age > 25)
   └─ Scan users
"#;

        assert_eq!(pretty(&plan).trim(), expected.trim());
    }

    #[test]
    fn pretty_print_join() {
        let on = Expr::bin(
            Expr::col("users", "id"),
            BinaryOp::Eq,
            Expr::col("orders", "user_id"),
        );
        let plan = users()
            .select(Expr::bin(
                Expr::col("users", "age"),
                BinaryOp::Gt,
                Expr::lit(25),
            ))
            .join(orders(), Some(on));

        let expected = r#"
Join (users.id = orders.user_id)
├─ Select (users.age > 25)
│  └─ Scan users
└─ Scan orders
"#;

        assert_eq!(pretty(&plan).trim(), expected.trim());
    }

    #[test]
    fn pretty_print_cross_join() {
        let plan = users().join(orders(), None);
        assert!(pretty(&plan).starts_with("Join (cross)"));
    }
}
