use std::fmt;

use crate::frontend::sql::lexer::Position;

/// Name resolution failures raised while building the logical plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    UnknownTable {
        name: String,
        position: Position,
    },

    UnknownColumn {
        name: String,
        position: Position,
    },

    /// An unqualified column exists in more than one joined table.
    AmbiguousColumn {
        name: String,
        tables: Vec<String>,
        position: Position,
    },

    /// The same table appears twice in the FROM/JOIN chain.
    DuplicateTable {
        name: String,
        position: Position,
    },
}

impl PlanError {
    pub fn name(&self) -> &str {
        match self {
            PlanError::UnknownTable { name, .. }
            | PlanError::UnknownColumn { name, .. }
            | PlanError::AmbiguousColumn { name, .. }
            | PlanError::DuplicateTable { name, .. } => name,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            PlanError::UnknownTable { position, .. }
            | PlanError::UnknownColumn { position, .. }
            | PlanError::AmbiguousColumn { position, .. }
            | PlanError::DuplicateTable { position, .. } => *position,
        }
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::UnknownTable { name, position } => {
                write!(f, "reference error at {position}: unknown table '{name}'")
            }
            PlanError::UnknownColumn { name, position } => {
                write!(f, "reference error at {position}: unknown column '{name}'")
            }
            PlanError::AmbiguousColumn {
                name,
                tables,
                position,
            } => write!(
                f,
                "reference error at {position}: column '{name}' is ambiguous (found in {})",
                tables.join(", ")
            ),
            PlanError::DuplicateTable { name, position } => {
                write!(f, "reference error at {position}: table '{name}' is used more than once")
            }
        }
    }
}

impl std::error::Error for PlanError {}
