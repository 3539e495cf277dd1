use std::time::Duration;

use serde::{Serialize, Serializer};

/// Tuple counts of one operator, numbered in pre-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorMetrics {
    pub id: usize,
    pub operator: &'static str,
    pub label: String,
    /// Rows pulled from children; for a scan, rows read from the table.
    pub rows_in: usize,
    pub rows_out: usize,
}

impl OperatorMetrics {
    pub fn new(id: usize, operator: &'static str, label: String) -> Self {
        Self {
            id,
            operator,
            label,
            rows_in: 0,
            rows_out: 0,
        }
    }
}

/// Produced once per run and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    #[serde(rename = "elapsed_us", serialize_with = "as_micros")]
    pub elapsed: Duration,
    pub rows_scanned: usize,
    pub rows_emitted: usize,
    pub operators: Vec<OperatorMetrics>,
}

impl Metrics {
    pub fn of_kind<'m>(&'m self, operator: &'m str) -> impl Iterator<Item = &'m OperatorMetrics> {
        self.operators.iter().filter(move |m| m.operator == operator)
    }

    pub fn join_rows_in(&self) -> usize {
        self.of_kind("Join").map(|m| m.rows_in).sum()
    }

    pub fn rows_read_from(&self, table: &str) -> usize {
        let label = format!("SeqScan {table}");
        self.of_kind("Scan")
            .filter(|m| m.label == label)
            .map(|m| m.rows_out)
            .sum()
    }
}

fn as_micros<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX))
}
