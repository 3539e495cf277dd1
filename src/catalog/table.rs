use anyhow::{Result, bail};

use crate::common::schema::{Column, Schema};
use crate::common::types::DataType;
use crate::common::value::Value;

pub type Row = Vec<Value>;

#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema, rows: Vec<Row>) -> Result<Self> {
        let name = name.into().to_lowercase();

        if schema.is_empty() {
            bail!("table '{name}' must have at least one column");
        }

        for (i, col) in schema.iter().enumerate() {
            if schema[..i].iter().any(|c| c.name == col.name) {
                bail!("table '{name}' has duplicate column '{}'", col.name);
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                bail!(
                    "row {i} of '{name}' has {} values, schema has {} columns",
                    row.len(),
                    schema.len()
                );
            }
        }

        Ok(Self { name, schema, rows })
    }

    pub fn from_columns(
        name: impl Into<String>,
        columns: &[(&str, DataType)],
        rows: Vec<Row>,
    ) -> Result<Self> {
        let schema = columns
            .iter()
            .map(|(name, ty)| Column::new(*name, *ty))
            .collect();
        Self::new(name, schema, rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.iter().any(|c| c.name == name)
    }
}
