use crate::exec::errors::ExecutionError;
use crate::exec::expr_eval::eval_predicate;
use crate::exec::metrics::OperatorMetrics;
use crate::exec::operator::{Operator, Row};
use crate::ir::expr::Expr;

/// For every left row, walks all right rows and emits matching pairs.
///
/// The right input is materialized on the first left row, so an empty left
/// side never reads the right one.
pub struct NestedLoopJoinExec<'a> {
    left: Box<dyn Operator + 'a>,
    right: Box<dyn Operator + 'a>,
    predicate: Option<Expr>,

    right_rows: Option<Vec<Row>>,
    current: Option<Row>,
    j: usize,

    stats: OperatorMetrics,
}

impl<'a> NestedLoopJoinExec<'a> {
    pub fn new(
        left: Box<dyn Operator + 'a>,
        right: Box<dyn Operator + 'a>,
        predicate: Option<Expr>,
        stats: OperatorMetrics,
    ) -> Self {
        Self {
            left,
            right,
            predicate,
            right_rows: None,
            current: None,
            j: 0,
            stats,
        }
    }

    fn materialize_right(&mut self) {
        if self.right_rows.is_some() {
            return;
        }
        let mut rows = Vec::new();
        while let Some(row) = self.right.next() {
            rows.push(row);
        }
        self.stats.rows_in += rows.len();
        self.right_rows = Some(rows);
    }
}

impl<'a> Operator for NestedLoopJoinExec<'a> {
    fn open(&mut self) -> Result<(), ExecutionError> {
        self.left.open()?;
        self.right.open()?;
        self.right_rows = None;
        self.current = None;
        self.j = 0;
        Ok(())
    }

    fn next(&mut self) -> Option<Row> {
        loop {
            if self.current.is_none() {
                let row = self.left.next()?;
                self.stats.rows_in += 1;
                self.current = Some(row);
                self.j = 0;
                self.materialize_right();
            }

            let (Some(left), Some(right_rows)) = (&self.current, &self.right_rows) else {
                return None;
            };
            while self.j < right_rows.len() {
                let right = &right_rows[self.j];
                self.j += 1;

                let mut merged = Vec::with_capacity(left.len() + right.len());
                merged.extend_from_slice(left);
                merged.extend_from_slice(right);

                let matched = self
                    .predicate
                    .as_ref()
                    .is_none_or(|p| eval_predicate(p, &merged));
                if matched {
                    self.stats.rows_out += 1;
                    return Some(merged);
                }
            }

            self.current = None;
        }
    }

    fn close(&mut self) {
        self.left.close();
        self.right.close();
        self.right_rows = None;
        self.current = None;
    }

    fn collect_metrics(&self, out: &mut Vec<OperatorMetrics>) {
        out.push(self.stats.clone());
        self.left.collect_metrics(out);
        self.right.collect_metrics(out);
    }
}
