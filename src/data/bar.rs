use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BarError {
    #[error("Non-positive {field} price: {value}")]
    NonPositivePrice { field: &'static str, value: f64 },
}

//represents a single daily ohlcv bar of (synthetic) market data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    //creates a new PriceBar, rejecting non-positive or non-finite prices
    //high/low ordering is not enforced: generated bars draw each field independently
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, BarError> {
        for (field, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(BarError::NonPositivePrice { field, value });
            }
        }

        Ok(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    //creates a flat bar where every price equals close
    pub fn flat(date: NaiveDate, close: f64, volume: u64) -> Result<Self, BarError> {
        Self::new(date, close, close, close, close, volume)
    }
}

//extracts the close prices of a series
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|bar| bar.close).collect()
}
