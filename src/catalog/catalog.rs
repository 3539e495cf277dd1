use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};

use crate::catalog::table::Table;

/// In-memory set of named tables. The pipeline only ever reads it.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    pub fn insert_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(&table.name) {
            bail!("table '{}' already exists", table.name);
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> Result<Table> {
        self.tables
            .remove(&name.to_lowercase())
            .ok_or_else(|| anyhow!("table '{name}' not found"))
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_lowercase())
    }

    /// Literal row count, the only statistic the optimizer looks at.
    pub fn row_count(&self, name: &str) -> Option<usize> {
        self.get_table(name).map(Table::row_count)
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
