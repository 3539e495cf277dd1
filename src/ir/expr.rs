use std::collections::BTreeSet;
use std::fmt;

use crate::common::value::Value;

/// A column as seen by plan operators.
///
/// `table` is `None` only for computed projection outputs. `index` stays `None`
/// in logical plans and is filled in when a plan is lowered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub name: String,
    pub index: Option<usize>,
}

impl ColumnRef {
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
            index: None,
        }
    }

    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
            index: None,
        }
    }

    pub fn resolved(&self, index: usize) -> Self {
        Self {
            index: Some(index),
            ..self.clone()
        }
    }

    pub fn same_column(&self, other: &ColumnRef) -> bool {
        self.table == other.table && self.name == other.name
    }

    pub fn unresolved(&self) -> Self {
        Self {
            index: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,

    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,

    And,
    Or,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Neq | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "=",
            BinaryOp::Neq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Column(ColumnRef),

    Literal(Value),

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn col(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Column(ColumnRef::qualified(table, name))
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn bin(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::bin(self, BinaryOp::And, other)
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::bin(self, BinaryOp::Or, other)
    }

    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Expr::Column(c) => Some(c),
            _ => None,
        }
    }

    pub fn collect_columns(&self, out: &mut BTreeSet<ColumnRef>) {
        match self {
            Expr::Column(c) => {
                out.insert(c.unresolved());
            }
            Expr::Literal(_) => {}
            Expr::Binary { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
        }
    }

    pub fn columns(&self) -> BTreeSet<ColumnRef> {
        let mut out = BTreeSet::new();
        self.collect_columns(&mut out);
        out
    }

    pub fn tables(&self) -> BTreeSet<String> {
        self.columns().into_iter().filter_map(|c| c.table).collect()
    }

    /// Splits on top-level `AND`; anything under an `OR` stays one clause.
    pub fn split_conjunction(self) -> Vec<Expr> {
        let mut out = Vec::new();
        split_into(self, &mut out);
        out
    }

    pub fn map_columns<E>(
        &self,
        f: &mut impl FnMut(&ColumnRef) -> Result<ColumnRef, E>,
    ) -> Result<Expr, E> {
        Ok(match self {
            Expr::Column(c) => Expr::Column(f(c)?),
            Expr::Literal(v) => Expr::Literal(v.clone()),
            Expr::Binary { left, op, right } => Expr::Binary {
                left: Box::new(left.map_columns(f)?),
                op: *op,
                right: Box::new(right.map_columns(f)?),
            },
        })
    }
}

fn split_into(expr: Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Binary {
            left,
            op: BinaryOp::And,
            right,
        } => {
            split_into(*left, out);
            split_into(*right, out);
        }
        other => out.push(other),
    }
}

pub fn conjoin(clauses: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    clauses.into_iter().reduce(Expr::and)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(c) => write!(f, "{c}"),
            Expr::Literal(Value::String(s)) => write!(f, "'{}'", s.replace('\'', "''")),
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Binary { left, op, right } => {
                // Predicates read strictly left to right, so only a logical
                // right operand needs grouping.
                match right.as_ref() {
                    Expr::Binary { op: inner, .. } if op.is_logical() && inner.is_logical() => {
                        write!(f, "{left} {op} ({right})")
                    }
                    _ => write!(f, "{left} {op} {right}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gt(table: &str, col: &str, v: i64) -> Expr {
        Expr::bin(Expr::col(table, col), BinaryOp::Gt, Expr::lit(v))
    }

    #[test]
    fn column_ref_resolution_keeps_identity() {
        let col = ColumnRef::qualified("users", "name");
        let resolved = col.resolved(3);

        assert_eq!(resolved.index, Some(3));
        assert!(resolved.same_column(&col));
        assert_ne!(resolved, col);
        assert_eq!(resolved.unresolved(), col);
    }

    #[test]
    fn display_simple_binary_expr() {
        let expr = gt("users", "age", 18);
        assert_eq!(expr.to_string(), "users.age > 18");
    }

    #[test]
    fn display_groups_right_nested_logic() {
        let expr = gt("a", "x", 1).and(gt("a", "y", 2).or(gt("b", "z", 3)));
        assert_eq!(expr.to_string(), "a.x > 1 AND (a.y > 2 OR b.z > 3)");

        let left_nested = gt("a", "x", 1).or(gt("a", "y", 2)).and(gt("b", "z", 3));
        assert_eq!(left_nested.to_string(), "a.x > 1 OR a.y > 2 AND b.z > 3");
    }

    #[test]
    fn split_stops_at_or() {
        let expr = gt("a", "x", 1)
            .or(gt("b", "y", 2))
            .and(gt("a", "z", 3))
            .and(gt("b", "w", 4));

        let clauses = expr.split_conjunction();
        assert_eq!(clauses.len(), 3);
        assert_eq!(clauses[0].to_string(), "a.x > 1 OR b.y > 2");
        assert_eq!(clauses[1].to_string(), "a.z > 3");
    }

    #[test]
    fn conjoin_round_trips_split() {
        let expr = gt("a", "x", 1).and(gt("a", "y", 2)).and(gt("b", "z", 3));
        let again = conjoin(expr.clone().split_conjunction()).unwrap();
        assert_eq!(again, expr);
        assert!(conjoin(Vec::new()).is_none());
    }

    #[test]
    fn collects_tables() {
        let expr = Expr::bin(
            Expr::col("users", "id"),
            BinaryOp::Eq,
            Expr::col("orders", "user_id"),
        );
        let tables: Vec<String> = expr.tables().into_iter().collect();
        assert_eq!(tables, vec!["orders".to_string(), "users".to_string()]);
    }
}
