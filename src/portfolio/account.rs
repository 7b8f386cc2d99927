use crate::engine::execution::{entry_cost, Trade};
use crate::metrics::EquityPoint;
use crate::portfolio::position::Position;
use crate::portfolio::sizing::PositionSizer;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//running cash/position state threaded through the execution pass
//each operation consumes the account and returns the updated one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Account {
    //initial account balance
    pub initial_cash: f64,

    //current cash
    pub cash: f64,

    //highest total value seen so far, starting at initial cash
    pub peak: f64,

    //open position, at most one (no pyramiding)
    pub position: Option<Position>,
}

impl Account {
    //creates a new flat account with initial cash
    pub fn new(initial_cash: f64) -> Self {
        Account {
            initial_cash,
            cash: initial_cash,
            peak: initial_cash,
            position: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.position.is_some()
    }

    pub fn shares(&self) -> u64 {
        self.position.map(|p| p.shares()).unwrap_or(0)
    }

    //cash plus mark-to-market position value
    pub fn total_value(&self, price: f64) -> f64 {
        self.cash + self.position.map(|p| p.market_value(price)).unwrap_or(0.0)
    }

    //opens a position if flat and the sized entry (with commission) is affordable
    //otherwise the account is returned unchanged and no trade is produced
    pub fn buy(
        self,
        date: NaiveDate,
        price: f64,
        sizer: &PositionSizer,
        commission_rate: f64,
    ) -> (Self, Option<Trade>) {
        if self.is_open() {
            return (self, None);
        }

        let shares = sizer.size(self.cash, price);
        if shares == 0 || self.cash < entry_cost(shares, price, commission_rate) {
            return (self, None);
        }

        let trade = Trade::buy(date, price, shares, commission_rate);
        let account = Account {
            cash: self.cash - trade.cash_value,
            position: Some(Position::open(trade)),
            ..self
        };
        (account, Some(trade))
    }

    //closes the open position in full; no-op when flat
    pub fn sell(self, date: NaiveDate, price: f64, commission_rate: f64) -> (Self, Option<Trade>) {
        let Some(position) = self.position else {
            return (self, None);
        };

        let trade = Trade::sell(date, price, position.shares(), commission_rate);
        let account = Account {
            cash: self.cash + trade.cash_value,
            position: None,
            ..self
        };
        (account, Some(trade))
    }

    //marks the account at `price`, updating the running peak
    pub fn mark(self, date: NaiveDate, price: f64) -> (Self, EquityPoint) {
        let total_value = self.total_value(price);
        let account = Account {
            peak: self.peak.max(total_value),
            ..self
        };
        let point = EquityPoint::new(date, account.shares(), price, total_value, account.peak);
        (account, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PositionSizing;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn buy_then_sell_round_trip() {
        let sizer = PositionSizer::new(PositionSizing::FixedShares, 10.0);
        let account = Account::new(10_000.0);

        let (account, buy) = account.buy(day(2), 100.0, &sizer, 0.01);
        assert_eq!(buy.map(|t| t.shares), Some(10));
        assert_relative_eq!(account.cash, 8_990.0, epsilon = 1e-9);
        assert_relative_eq!(account.total_value(100.0), 9_990.0, epsilon = 1e-9);

        let (account, sell) = account.sell(day(3), 110.0, 0.01);
        assert_relative_eq!(sell.unwrap().cash_value, 1_089.0, epsilon = 1e-9);
        assert_relative_eq!(account.cash, 10_079.0, epsilon = 1e-9);
        assert!(!account.is_open());
        assert_relative_eq!(account.total_value(0.0), 10_079.0, epsilon = 1e-9);
    }

    #[test]
    fn no_pyramiding() {
        let sizer = PositionSizer::new(PositionSizing::FixedShares, 1.0);
        let (account, first) = Account::new(1_000.0).buy(day(2), 10.0, &sizer, 0.0);
        let (account, second) = account.buy(day(3), 10.0, &sizer, 0.0);

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(account.shares(), 1);
    }

    #[test]
    fn sell_when_flat_is_noop() {
        let account = Account::new(1_000.0);
        let (after, trade) = account.sell(day(2), 10.0, 0.0);
        assert!(trade.is_none());
        assert_eq!(after, account);
    }

    #[test]
    fn zero_share_entry_is_skipped() {
        let sizer = PositionSizer::new(PositionSizing::FixedAmount, 5.0);
        let (account, trade) = Account::new(1_000.0).buy(day(2), 10.0, &sizer, 0.0);
        assert!(trade.is_none());
        assert_eq!(account.cash, 1_000.0);
    }

    #[test]
    fn peak_is_monotonic() {
        let account = Account::new(100.0);
        let (account, _) = account.mark(day(2), 1.0);
        let account = Account { cash: 150.0, ..account };
        let (account, high) = account.mark(day(3), 1.0);
        let account = Account { cash: 90.0, ..account };
        let (account, low) = account.mark(day(4), 1.0);

        assert_eq!(high.peak, 150.0);
        assert_eq!(low.peak, 150.0);
        assert_eq!(low.total_value, 90.0);
        assert_eq!(account.peak, 150.0);
    }
}
