pub mod bar;
pub mod generator;

pub use bar::{closes, BarError, PriceBar};
pub use generator::{is_weekend, trading_days, PriceSeriesGenerator};
