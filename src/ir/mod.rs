pub mod expr;
pub mod plan;
pub mod pretty;
pub mod tree;
pub mod validate;

pub use expr::{BinaryOp, ColumnRef, Expr};
pub use plan::{LogicalPlan, QueryPlan};
pub use tree::PlanTree;
pub use validate::SchemaError;
