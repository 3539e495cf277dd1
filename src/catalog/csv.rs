use std::io::Read;

use anyhow::{Context, Result, bail};
use log::{debug, warn};

use crate::catalog::table::{Row, Table};
use crate::common::schema::Column;
use crate::common::types::DataType;
use crate::common::value::Value;

/// Builds a table from a headered CSV stream.
///
/// Each cell is inferred independently (integer, float, string, empty as NULL)
/// and a column's type is the widest type seen in it. Rows whose arity does not
/// match the header are skipped.
pub fn load_csv<R: Read>(name: &str, reader: R) -> Result<Table> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(::csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading CSV header for '{name}'"))?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("reading CSV row {} of '{name}'", i + 1))?;
        if record.len() != headers.len() {
            warn!(
                "row {} of '{}' has {} columns, expected {}; skipping",
                i + 1,
                name,
                record.len(),
                headers.len()
            );
            continue;
        }
        rows.push(record.iter().map(Value::infer).collect());
    }

    if rows.is_empty() {
        bail!("no valid data rows found for '{name}'");
    }

    let schema = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let ty = rows
                .iter()
                .filter_map(|row| row[idx].data_type())
                .reduce(DataType::widen)
                .unwrap_or(DataType::String);
            Column::new(header.as_str(), ty)
        })
        .collect();

    debug!("loaded {} rows into '{}'", rows.len(), name);
    Table::new(name, schema, rows)
}
