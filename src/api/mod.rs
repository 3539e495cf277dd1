pub mod db;
pub mod errors;

pub use db::{PlanResult, Planned, QueryPlanner, plan_and_run};
pub use errors::QueryError;
