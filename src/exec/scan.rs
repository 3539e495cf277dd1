use crate::catalog::Catalog;
use crate::exec::errors::ExecutionError;
use crate::exec::metrics::OperatorMetrics;
use crate::exec::operator::{Operator, Row};

pub struct ScanExec<'a> {
    catalog: &'a Catalog,
    table: String,
    rows: Option<&'a [Row]>,
    pos: usize,
    stats: OperatorMetrics,
}

impl<'a> ScanExec<'a> {
    pub fn new(catalog: &'a Catalog, table: String, stats: OperatorMetrics) -> Self {
        Self {
            catalog,
            table,
            rows: None,
            pos: 0,
            stats,
        }
    }
}

impl<'a> Operator for ScanExec<'a> {
    fn open(&mut self) -> Result<(), ExecutionError> {
        let table = self
            .catalog
            .get_table(&self.table)
            .ok_or_else(|| ExecutionError::TableNotFound {
                table: self.table.clone(),
            })?;
        self.rows = Some(table.rows.as_slice());
        self.pos = 0;
        Ok(())
    }

    fn next(&mut self) -> Option<Row> {
        let row = self.rows?.get(self.pos)?.clone();
        self.pos += 1;
        self.stats.rows_in += 1;
        self.stats.rows_out += 1;
        Some(row)
    }

    fn close(&mut self) {
        self.rows = None;
    }

    fn collect_metrics(&self, out: &mut Vec<OperatorMetrics>) {
        out.push(self.stats.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Table;
    use crate::common::types::DataType;
    use crate::common::value::Value;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .insert_table(
                Table::from_columns(
                    "t",
                    &[("x", DataType::Int64)],
                    vec![vec![Value::Int64(1)], vec![Value::Int64(2)]],
                )
                .unwrap(),
            )
            .unwrap();
        catalog
    }

    fn stats() -> OperatorMetrics {
        OperatorMetrics::new(0, "Scan", "SeqScan t".into())
    }

    #[test]
    fn scan_yields_rows_in_order() {
        let catalog = catalog();
        let mut scan = ScanExec::new(&catalog, "t".into(), stats());
        scan.open().unwrap();

        assert_eq!(scan.next(), Some(vec![Value::Int64(1)]));
        assert_eq!(scan.next(), Some(vec![Value::Int64(2)]));
        assert_eq!(scan.next(), None);

        let mut metrics = Vec::new();
        scan.collect_metrics(&mut metrics);
        assert_eq!(metrics[0].rows_out, 2);
    }

    #[test]
    fn missing_table_fails_on_open() {
        let catalog = Catalog::new();
        let mut scan = ScanExec::new(&catalog, "t".into(), stats());

        assert_eq!(
            scan.open(),
            Err(ExecutionError::TableNotFound { table: "t".into() })
        );
        assert_eq!(scan.next(), None);
    }
}
