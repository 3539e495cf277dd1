use std::fmt;

use crate::ir::validate::SchemaError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizerError {
    InvariantViolation { rule: &'static str, reason: String },
}

impl OptimizerError {
    pub fn invariant(rule: &'static str, err: SchemaError) -> Self {
        Self::InvariantViolation {
            rule,
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for OptimizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvariantViolation { rule, reason } => {
                write!(f, "optimizer error: invariant violated by {rule} ({reason})")
            }
        }
    }
}

impl std::error::Error for OptimizerError {}
