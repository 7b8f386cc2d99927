use crate::data::PriceBar;
use crate::metrics::EquityPoint;
use crate::portfolio::{Account, PositionSizer};
use crate::strategy::{Signal, Strategy};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//trade side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

//represents an executed trade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: TradeSide,
    pub date: NaiveDate,
    pub price: f64,
    pub shares: u64,
    //buy: total cost including commission, sell: revenue net of commission
    pub cash_value: f64,
}

impl Trade {
    pub fn buy(date: NaiveDate, price: f64, shares: u64, commission_rate: f64) -> Self {
        Trade {
            side: TradeSide::Buy,
            date,
            price,
            shares,
            cash_value: entry_cost(shares, price, commission_rate),
        }
    }

    pub fn sell(date: NaiveDate, price: f64, shares: u64, commission_rate: f64) -> Self {
        Trade {
            side: TradeSide::Sell,
            date,
            price,
            shares,
            cash_value: exit_revenue(shares, price, commission_rate),
        }
    }

    //returns the notional value of the trade before commission
    pub fn notional_value(&self) -> f64 {
        self.price * self.shares as f64
    }

    //commission paid on this leg
    pub fn commission(&self) -> f64 {
        (self.cash_value - self.notional_value()).abs()
    }
}

//cash debited for an entry
pub fn entry_cost(shares: u64, price: f64, commission_rate: f64) -> f64 {
    shares as f64 * price * (1.0 + commission_rate)
}

//cash credited for an exit
pub fn exit_revenue(shares: u64, price: f64, commission_rate: f64) -> f64 {
    shares as f64 * price * (1.0 - commission_rate)
}

//output of a single execution pass
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub account: Account,
}

//sequential, single-pass executor
//at bar i only bars <= i are consulted; no randomness
#[derive(Debug, Clone, Copy)]
pub struct ExecutionEngine {
    sizer: PositionSizer,
    commission_rate: f64,
    initial_cash: f64,
}

impl ExecutionEngine {
    pub fn new(sizer: PositionSizer, commission_rate: f64, initial_cash: f64) -> Self {
        ExecutionEngine {
            sizer,
            commission_rate,
            initial_cash,
        }
    }

    //runs the strategy over `bars`, returning the trade log and equity curve
    pub fn execute<S: Strategy + ?Sized>(&self, bars: &[PriceBar], strategy: &S) -> Execution {
        let start = Execution {
            trades: Vec::new(),
            equity_curve: Vec::with_capacity(bars.len()),
            account: Account::new(self.initial_cash),
        };

        if bars.len() <= strategy.warmup() {
            //no bar is ever evaluated: the curve stays flat at initial cash
            return bars.iter().fold(start, |mut execution, bar| {
                let (account, point) = execution.account.mark(bar.date, bar.close);
                execution.account = account;
                execution.equity_curve.push(point);
                execution
            });
        }

        (strategy.warmup()..bars.len()).fold(start, |execution, index| {
            let signal = strategy.signal(index, execution.account.is_open());
            self.step(execution, &bars[index], signal)
        })
    }

    //applies one bar's signal and records its equity point
    fn step(&self, mut execution: Execution, bar: &PriceBar, signal: Signal) -> Execution {
        let price = bar.close;

        let (account, trade) = match signal {
            Signal::Buy => execution
                .account
                .buy(bar.date, price, &self.sizer, self.commission_rate),
            Signal::Sell => execution.account.sell(bar.date, price, self.commission_rate),
            Signal::None => (execution.account, None),
        };

        match (signal, trade) {
            (_, Some(trade)) => {
                tracing::debug!(
                    side = ?trade.side,
                    date = %trade.date,
                    price = trade.price,
                    shares = trade.shares,
                    cash_value = trade.cash_value,
                    "trade executed"
                );
                execution.trades.push(trade);
            }
            (Signal::Buy, None) => {
                tracing::debug!(date = %bar.date, price, cash = account.cash, "buy signal skipped");
            }
            _ => {}
        }

        let (account, point) = account.mark(bar.date, price);
        execution.account = account;
        execution.equity_curve.push(point);
        execution
    }
}
