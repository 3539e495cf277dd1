pub mod config;

pub mod api;
pub mod catalog;
pub mod common;
pub mod exec;
pub mod frontend;
pub mod ir;
pub mod optimizer;
pub mod physical;
pub mod planner;
