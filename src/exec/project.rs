use crate::exec::errors::ExecutionError;
use crate::exec::expr_eval::eval_value;
use crate::exec::metrics::OperatorMetrics;
use crate::exec::operator::{Operator, Row};
use crate::ir::expr::Expr;

pub struct ProjectExec<'a> {
    input: Box<dyn Operator + 'a>,
    exprs: Vec<Expr>,
    stats: OperatorMetrics,
}

impl<'a> ProjectExec<'a> {
    pub fn new(input: Box<dyn Operator + 'a>, exprs: Vec<Expr>, stats: OperatorMetrics) -> Self {
        Self {
            input,
            exprs,
            stats,
        }
    }
}

impl<'a> Operator for ProjectExec<'a> {
    fn open(&mut self) -> Result<(), ExecutionError> {
        self.input.open()
    }

    fn next(&mut self) -> Option<Row> {
        let row = self.input.next()?;
        self.stats.rows_in += 1;
        self.stats.rows_out += 1;
        Some(self.exprs.iter().map(|e| eval_value(e, &row)).collect())
    }

    fn close(&mut self) {
        self.input.close();
    }

    fn collect_metrics(&self, out: &mut Vec<OperatorMetrics>) {
        out.push(self.stats.clone());
        self.input.collect_metrics(out);
    }
}
