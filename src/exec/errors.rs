use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// A planned table is missing from the catalog at run time.
    TableNotFound { table: String },
}

impl ExecutionError {
    pub fn table_name(&self) -> &str {
        match self {
            ExecutionError::TableNotFound { table } => table,
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::TableNotFound { table } => {
                write!(f, "execution error: table '{table}' not found")
            }
        }
    }
}

impl std::error::Error for ExecutionError {}
