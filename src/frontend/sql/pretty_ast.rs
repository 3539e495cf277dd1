use crate::frontend::sql::ast::*;

pub fn pretty_ast(stmt: &SelectStmt) -> String {
    let mut out = String::new();
    out.push_str("Select\n");

    match &stmt.projection {
        Projection::Wildcard => line(&mut out, 1, "Projection *"),
        Projection::Items(items) => {
            line(&mut out, 1, "Projection");
            for item in items {
                let text = match item {
                    SelectItem::Column(c) => c.display_name(),
                    SelectItem::Arithmetic {
                        column, op, text, ..
                    } => format!("{} {} {}", column.display_name(), op.word(), text),
                };
                line(&mut out, 2, &text);
            }
        }
    }

    line(&mut out, 1, &format!("From {}", stmt.from.name));
    for join in &stmt.joins {
        line(
            &mut out,
            1,
            &format!(
                "Join {} ON {} = {}",
                join.table.name,
                join.left.display_name(),
                join.right.display_name()
            ),
        );
    }

    if let Some(selection) = &stmt.selection {
        line(&mut out, 1, "Where");
        pretty_expr(selection, 2, &mut out);
    }

    if let Some(limit) = stmt.limit {
        line(&mut out, 1, &format!("Limit {limit}"));
    }

    out
}

fn pretty_expr(expr: &Expr, depth: usize, out: &mut String) {
    match expr {
        Expr::Logical { left, op, right } => {
            line(out, depth, &format!("{op:?}"));
            pretty_expr(left, depth + 1, out);
            pretty_expr(right, depth + 1, out);
        }
        other => line(out, depth, &other.to_string()),
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(text);
    out.push('\n');
}
