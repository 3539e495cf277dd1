use crate::common::value::Value;
use crate::exec::operator::Row;
use crate::exec::value_cmp::{Operand, arithmetic, compare};
use crate::ir::expr::{BinaryOp, Expr};

pub fn eval_value(expr: &Expr, row: &Row) -> Value {
    match expr {
        Expr::Column(col) => col
            .index
            .and_then(|i| row.get(i))
            .cloned()
            .unwrap_or(Value::Null),
        Expr::Literal(v) => v.clone(),
        Expr::Binary { left, op, right } => match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                arithmetic(*op, &eval_value(left, row), &eval_value(right, row))
            }
            _ => Value::Int64(i64::from(eval_predicate(expr, row))),
        },
    }
}

/// Truth of a predicate. `AND`/`OR` evaluate left to right and short-circuit.
pub fn eval_predicate(expr: &Expr, row: &Row) -> bool {
    match expr {
        Expr::Binary {
            left,
            op: BinaryOp::And,
            right,
        } => eval_predicate(left, row) && eval_predicate(right, row),
        Expr::Binary {
            left,
            op: BinaryOp::Or,
            right,
        } => eval_predicate(left, row) || eval_predicate(right, row),
        Expr::Binary { left, op, right } if op.is_comparison() => {
            let lv = eval_value(left, row);
            let rv = eval_value(right, row);
            compare(*op, operand(left, &lv), operand(right, &rv))
        }
        _ => false,
    }
}

fn operand<'v>(expr: &Expr, value: &'v Value) -> Operand<'v> {
    if matches!(expr, Expr::Literal(_)) {
        Operand::literal(value)
    } else {
        Operand::column(value)
    }
}
