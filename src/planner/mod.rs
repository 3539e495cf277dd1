pub mod errors;
pub mod logical;

pub use errors::PlanError;
pub use logical::LogicalPlanner;
