pub mod interval;
pub mod period;
pub mod price;
pub mod profile;
pub mod ticker;
pub mod warning;
pub mod window;
