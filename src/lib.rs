pub mod catalog;
pub mod config;
pub mod orbit;
pub mod report;
