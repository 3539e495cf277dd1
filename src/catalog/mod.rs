pub mod catalog;
pub mod csv;
pub mod table;

pub use catalog::Catalog;
pub use table::{Row, Table};
