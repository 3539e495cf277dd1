pub mod lower;
pub mod plan;

pub use lower::lower;
pub use plan::{PhysicalNode, PhysicalPlan, Strategy};
