use crate::engine::execution::Trade;
use serde::{Deserialize, Serialize};

//the single open long position; holds the buy that opened it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry: Trade,
}

impl Position {
    pub fn open(entry: Trade) -> Self {
        Position { entry }
    }

    pub fn shares(&self) -> u64 {
        self.entry.shares
    }

    //mark-to-market value at a given price
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares() as f64 * price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn marks_entry_shares_at_price() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let position = Position::open(Trade::buy(date, 100.0, 10, 0.01));

        assert_eq!(position.shares(), 10);
        assert_relative_eq!(position.market_value(110.0), 1100.0);
    }
}
