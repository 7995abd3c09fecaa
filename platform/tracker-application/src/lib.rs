pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod reporting;
