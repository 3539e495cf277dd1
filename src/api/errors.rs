use std::fmt;

use crate::exec::errors::ExecutionError;
use crate::frontend::sql::errors::ParseError;
use crate::optimizer::errors::OptimizerError;
use crate::planner::errors::PlanError;

/// Everything a request can fail with. Any failure aborts the remaining
/// stages of that request.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    Syntax(ParseError),
    Reference(PlanError),
    Invariant(OptimizerError),
    Execution(ExecutionError),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Syntax(e) => write!(f, "{e}"),
            QueryError::Reference(e) => write!(f, "{e}"),
            QueryError::Invariant(e) => write!(f, "{e}"),
            QueryError::Execution(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Syntax(e) => Some(e),
            QueryError::Reference(e) => Some(e),
            QueryError::Invariant(e) => Some(e),
            QueryError::Execution(e) => Some(e),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(e: ParseError) -> Self {
        QueryError::Syntax(e)
    }
}

impl From<PlanError> for QueryError {
    fn from(e: PlanError) -> Self {
        QueryError::Reference(e)
    }
}

impl From<OptimizerError> for QueryError {
    fn from(e: OptimizerError) -> Self {
        QueryError::Invariant(e)
    }
}

impl From<ExecutionError> for QueryError {
    fn from(e: ExecutionError) -> Self {
        QueryError::Execution(e)
    }
}
