pub mod join_reorder;
pub mod predicate_pushdown;
pub mod projection_pushdown;

pub use join_reorder::join_reorder;
pub use predicate_pushdown::predicate_pushdown;
pub use projection_pushdown::projection_pushdown;
