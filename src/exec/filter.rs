use crate::exec::errors::ExecutionError;
use crate::exec::expr_eval::eval_predicate;
use crate::exec::metrics::OperatorMetrics;
use crate::exec::operator::{Operator, Row};
use crate::ir::expr::Expr;

pub struct FilterExec<'a> {
    input: Box<dyn Operator + 'a>,
    predicate: Expr,
    stats: OperatorMetrics,
}

impl<'a> FilterExec<'a> {
    pub fn new(input: Box<dyn Operator + 'a>, predicate: Expr, stats: OperatorMetrics) -> Self {
        Self {
            input,
            predicate,
            stats,
        }
    }
}

impl<'a> Operator for FilterExec<'a> {
    fn open(&mut self) -> Result<(), ExecutionError> {
        self.input.open()
    }

    fn next(&mut self) -> Option<Row> {
        while let Some(row) = self.input.next() {
            self.stats.rows_in += 1;
            if eval_predicate(&self.predicate, &row) {
                self.stats.rows_out += 1;
                return Some(row);
            }
        }
        None
    }

    fn close(&mut self) {
        self.input.close();
    }

    fn collect_metrics(&self, out: &mut Vec<OperatorMetrics>) {
        out.push(self.stats.clone());
        self.input.collect_metrics(out);
    }
}
