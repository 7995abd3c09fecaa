pub mod catalog;
pub mod chart;
pub mod period_resolver;
pub mod table;
