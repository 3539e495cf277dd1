//! Comparison and arithmetic over loosely typed cell values.
//!
//! A comparison that cannot be carried out evaluates to false; it never
//! aborts the query.

use std::cmp::Ordering;

use crate::common::value::Value;
use crate::ir::expr::BinaryOp;

const FLOAT_EPSILON: f64 = 1e-9;

/// One side of a comparison. `literal` marks values written in the query,
/// whose lexical form picks the comparison domain.
#[derive(Debug, Clone, Copy)]
pub struct Operand<'v> {
    pub value: &'v Value,
    pub literal: bool,
}

impl<'v> Operand<'v> {
    pub fn column(value: &'v Value) -> Self {
        Self {
            value,
            literal: false,
        }
    }

    pub fn literal(value: &'v Value) -> Self {
        Self {
            value,
            literal: true,
        }
    }

    fn is_numeric_literal(&self) -> bool {
        self.literal && matches!(self.value, Value::Int64(_) | Value::Float64(_))
    }

    fn is_string_literal(&self) -> bool {
        self.literal && matches!(self.value, Value::String(_))
    }
}

pub fn compare(op: BinaryOp, left: Operand<'_>, right: Operand<'_>) -> bool {
    if left.value.is_null() || right.value.is_null() {
        return false;
    }

    if left.is_numeric_literal() || right.is_numeric_literal() {
        return compare_numeric(op, left.value, right.value);
    }
    if left.is_string_literal() || right.is_string_literal() {
        return compare_text(op, left.value, right.value);
    }

    match (left.value, right.value) {
        (Value::String(_), Value::String(_)) => compare_text(op, left.value, right.value),
        (Value::String(_), _) | (_, Value::String(_)) => false,
        _ => compare_numeric(op, left.value, right.value),
    }
}

fn compare_numeric(op: BinaryOp, left: &Value, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
        _ => {
            let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
                return false;
            };
            if (a - b).abs() < FLOAT_EPSILON {
                Ordering::Equal
            } else if a < b {
                Ordering::Less
            } else if a > b {
                Ordering::Greater
            } else {
                // NaN
                return false;
            }
        }
    };
    matches_ordering(op, ordering)
}

fn compare_text(op: BinaryOp, left: &Value, right: &Value) -> bool {
    let (Some(a), Some(b)) = (left.as_text(), right.as_text()) else {
        return false;
    };
    let equal = a.to_lowercase() == b.to_lowercase();
    match op {
        BinaryOp::Eq => equal,
        BinaryOp::Neq => !equal,
        _ => false,
    }
}

fn matches_ordering(op: BinaryOp, ordering: Ordering) -> bool {
    match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::Neq => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => false,
    }
}

/// Arithmetic for computed select items. Anything that cannot be computed,
/// including division by zero and integer overflow, is NULL.
pub fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Value {
    if let (Value::Int64(a), Value::Int64(b)) = (left, right) {
        let exact = match op {
            BinaryOp::Add => Some(a.checked_add(*b)),
            BinaryOp::Sub => Some(a.checked_sub(*b)),
            BinaryOp::Mul => Some(a.checked_mul(*b)),
            _ => None,
        };
        if let Some(result) = exact {
            return result.map(Value::Int64).unwrap_or(Value::Null);
        }
    }

    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Value::Null;
    };
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div if b == 0.0 => return Value::Null,
        BinaryOp::Div => a / b,
        _ => return Value::Null,
    };
    if result.is_finite() {
        Value::Float64(result)
    } else {
        Value::Null
    }
}
