pub mod catalog;
pub mod market_data;
