use crate::exec::errors::ExecutionError;
use crate::exec::metrics::OperatorMetrics;

pub use crate::catalog::Row;

/// Pull-style operator. `open` binds catalog data and is the only step that
/// can fail; `next` yields rows until the input is exhausted.
pub trait Operator {
    fn open(&mut self) -> Result<(), ExecutionError>;
    fn next(&mut self) -> Option<Row>;
    fn close(&mut self);

    /// Appends this operator's counters, then its children's.
    fn collect_metrics(&self, out: &mut Vec<OperatorMetrics>);
}
