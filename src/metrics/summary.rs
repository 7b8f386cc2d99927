use crate::config::BacktestConfig;
use crate::engine::execution::{Trade, TradeSide};
use crate::metrics::timeseries::{max_drawdown, sharpe_ratio, total_values, EquityPoint};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

//a closed buy -> sell pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    pub entry: Trade,
    pub exit: Trade,
}

impl RoundTrip {
    //net of both commissions
    pub fn profit_loss(&self) -> f64 {
        self.exit.cash_value - self.entry.cash_value
    }

    pub fn is_win(&self) -> bool {
        self.exit.cash_value > self.entry.cash_value
    }

    pub fn is_loss(&self) -> bool {
        self.exit.cash_value < self.entry.cash_value
    }
}

//pairs trades buy -> sell in emission order
//a sell closes the single open buy; a sell with nothing open and a trailing buy are unmatched
pub fn pair_trades(trades: &[Trade]) -> Vec<RoundTrip> {
    let mut round_trips = Vec::with_capacity(trades.len() / 2);
    let mut open: Option<Trade> = None;

    for trade in trades {
        match trade.side {
            TradeSide::Buy => open = Some(*trade),
            TradeSide::Sell => {
                if let Some(entry) = open.take() {
                    round_trips.push(RoundTrip {
                        entry,
                        exit: *trade,
                    });
                }
            }
        }
    }

    round_trips
}

//summary metrics for a backtest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub initial_cash: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub avg_profit_loss: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub profit_factor: f64,
    pub exposure: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from the trade log and equity curve
    //`final_close` is the last bar's close, None for an empty series
    pub fn from_backtest(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        config: &BacktestConfig,
        final_close: Option<f64>,
    ) -> Self {
        let initial_cash = config.initial_cash;

        let (cash, shares) = replay_cash(trades, initial_cash);
        let final_value = cash + shares as f64 * final_close.unwrap_or(0.0);

        let total_return = final_value - initial_cash;
        let total_return_pct = if initial_cash != 0.0 {
            total_return / initial_cash * 100.0
        } else {
            0.0
        };

        let round_trips = pair_trades(trades);
        let trade_stats = calculate_trade_statistics(&round_trips);
        let closed = trade_stats.winning_trades + trade_stats.losing_trades;

        let win_rate = if closed > 0 {
            trade_stats.winning_trades as f64 / closed as f64 * 100.0
        } else {
            0.0
        };

        let avg_profit_loss = if closed > 0 {
            total_return / closed as f64
        } else {
            0.0
        };

        SummaryMetrics {
            initial_cash,
            final_value,
            total_return,
            total_return_pct,
            max_drawdown: max_drawdown(equity_curve, initial_cash),
            sharpe_ratio: sharpe_ratio(&total_values(equity_curve)),
            win_rate,
            total_trades: trades.len() / 2,
            winning_trades: trade_stats.winning_trades,
            losing_trades: trade_stats.losing_trades,
            avg_profit_loss,
            avg_win: trade_stats.avg_win,
            avg_loss: trade_stats.avg_loss,
            largest_win: trade_stats.largest_win,
            largest_loss: trade_stats.largest_loss,
            profit_factor: trade_stats.profit_factor,
            exposure: calculate_exposure(equity_curve),
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        self.to_table().printstd();
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("Initial Cash", format!("${:.2}", self.initial_cash)),
            ("Final Value", format!("${:.2}", self.final_value)),
            (
                "Total Return",
                format!("${:.2} ({:.2}%)", self.total_return, self.total_return_pct),
            ),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown)),
            ("Sharpe Ratio", format!("{:.2}", self.sharpe_ratio)),
            ("Total Trades", format!("{}", self.total_trades)),
            (
                "Won / Lost",
                format!("{} / {}", self.winning_trades, self.losing_trades),
            ),
            ("Win Rate", format!("{:.2}%", self.win_rate)),
            ("Avg P/L per Trade", format!("${:.2}", self.avg_profit_loss)),
            ("Avg Win", format!("${:.2}", self.avg_win)),
            ("Avg Loss", format!("${:.2}", self.avg_loss)),
            ("Largest Win", format!("${:.2}", self.largest_win)),
            ("Largest Loss", format!("${:.2}", self.largest_loss)),
            ("Profit Factor", format!("{:.3}", self.profit_factor)),
            ("Exposure", format!("{:.2}%", self.exposure)),
        ];

        for (name, value) in rows {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
        }

        table
    }
}

//cash and shares after applying every trade to initial cash
fn replay_cash(trades: &[Trade], initial_cash: f64) -> (f64, u64) {
    trades
        .iter()
        .fold((initial_cash, 0u64), |(cash, shares), trade| match trade.side {
            TradeSide::Buy => (cash - trade.cash_value, trade.shares),
            TradeSide::Sell => (cash + trade.cash_value, 0),
        })
}

#[derive(Debug, Default)]
struct TradeStats {
    winning_trades: usize,
    losing_trades: usize,
    avg_win: f64,
    avg_loss: f64,
    profit_factor: f64,
    largest_win: f64,
    largest_loss: f64,
}

//ties count as neither win nor loss
fn calculate_trade_statistics(round_trips: &[RoundTrip]) -> TradeStats {
    let wins: Vec<f64> = round_trips
        .iter()
        .filter(|trip| trip.is_win())
        .map(RoundTrip::profit_loss)
        .collect();
    let losses: Vec<f64> = round_trips
        .iter()
        .filter(|trip| trip.is_loss())
        .map(RoundTrip::profit_loss)
        .collect();

    if wins.is_empty() && losses.is_empty() {
        return TradeStats::default();
    }

    let gross_wins: f64 = wins.iter().sum();
    let gross_losses: f64 = losses.iter().sum::<f64>().abs();

    let avg_win = if wins.is_empty() {
        0.0
    } else {
        gross_wins / wins.len() as f64
    };

    let avg_loss = if losses.is_empty() {
        0.0
    } else {
        -gross_losses / losses.len() as f64
    };

    let profit_factor = if gross_losses > 0.0 {
        gross_wins / gross_losses
    } else {
        0.0
    };

    TradeStats {
        winning_trades: wins.len(),
        losing_trades: losses.len(),
        avg_win,
        avg_loss,
        profit_factor,
        largest_win: wins.iter().fold(0.0f64, |a, &b| a.max(b)),
        largest_loss: losses.iter().fold(0.0f64, |a, &b| a.min(b)),
    }
}

//percent of equity points with shares held
fn calculate_exposure(equity_curve: &[EquityPoint]) -> f64 {
    if equity_curve.is_empty() {
        return 0.0;
    }

    let in_market = equity_curve.iter().filter(|point| point.shares > 0).count();
    in_market as f64 / equity_curve.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn config(initial_cash: f64) -> BacktestConfig {
        BacktestConfig::new("AAPL", day(1), day(31)).with_initial_cash(initial_cash)
    }

    fn trip(buy: f64, sell: f64, shares: u64, rate: f64) -> [Trade; 2] {
        [
            Trade::buy(day(2), buy, shares, rate),
            Trade::sell(day(3), sell, shares, rate),
        ]
    }

    #[test]
    fn pairs_in_emission_order() {
        let mut trades = Vec::new();
        trades.extend(trip(100.0, 110.0, 10, 0.0));
        trades.extend(trip(50.0, 40.0, 5, 0.0));
        trades.push(Trade::buy(day(4), 10.0, 1, 0.0));

        let trips = pair_trades(&trades);
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].entry.price, 100.0);
        assert_eq!(trips[1].exit.price, 40.0);
    }

    #[test]
    fn orphan_sell_is_not_paired() {
        let trades = [Trade::sell(day(2), 10.0, 1, 0.0)];
        assert!(pair_trades(&trades).is_empty());
    }

    #[test]
    fn commission_scenario_profit() {
        let trades = trip(100.0, 110.0, 10, 0.01);
        let trips = pair_trades(&trades);

        assert_relative_eq!(trips[0].entry.cash_value, 1010.0, epsilon = 1e-9);
        assert_relative_eq!(trips[0].exit.cash_value, 1089.0, epsilon = 1e-9);
        assert_relative_eq!(trips[0].profit_loss(), 79.0, epsilon = 1e-9);
    }

    #[test]
    fn ties_are_neither_win_nor_loss() {
        let mut trades = Vec::new();
        trades.extend(trip(100.0, 100.0, 10, 0.0));
        trades.extend(trip(100.0, 120.0, 10, 0.0));

        let summary = SummaryMetrics::from_backtest(&trades, &[], &config(10_000.0), Some(120.0));
        assert_eq!(summary.total_trades, 2);
        assert_eq!(summary.winning_trades, 1);
        assert_eq!(summary.losing_trades, 0);
        assert_relative_eq!(summary.win_rate, 100.0);
        //avg p/l divides total return by closed non-tied pairs
        assert_relative_eq!(summary.avg_profit_loss, 200.0);
        assert_eq!(summary.profit_factor, 0.0);
    }

    #[test]
    fn win_loss_statistics() {
        let mut trades = Vec::new();
        trades.extend(trip(100.0, 130.0, 10, 0.0));
        trades.extend(trip(100.0, 90.0, 10, 0.0));
        trades.extend(trip(100.0, 110.0, 10, 0.0));

        let summary = SummaryMetrics::from_backtest(&trades, &[], &config(10_000.0), Some(1.0));
        assert_eq!(summary.winning_trades, 2);
        assert_eq!(summary.losing_trades, 1);
        assert_relative_eq!(summary.win_rate, 200.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(summary.final_value, 10_300.0);
        assert_relative_eq!(summary.total_return_pct, 3.0, epsilon = 1e-9);
        assert_relative_eq!(summary.avg_win, 200.0);
        assert_relative_eq!(summary.avg_loss, -100.0);
        assert_relative_eq!(summary.largest_win, 300.0);
        assert_relative_eq!(summary.largest_loss, -100.0);
        assert_relative_eq!(summary.profit_factor, 4.0);
        assert_relative_eq!(summary.avg_profit_loss, 100.0);
    }

    #[test]
    fn unliquidated_position_is_marked_at_final_close() {
        let trades = [Trade::buy(day(2), 100.0, 10, 0.0)];
        let summary = SummaryMetrics::from_backtest(&trades, &[], &config(10_000.0), Some(150.0));

        assert_relative_eq!(summary.final_value, 10_500.0);
        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.avg_profit_loss, 0.0);
    }

    #[test]
    fn empty_run_is_all_zero() {
        let summary = SummaryMetrics::from_backtest(&[], &[], &config(100_000.0), None);

        assert_eq!(summary.final_value, 100_000.0);
        assert_eq!(summary.total_return, 0.0);
        assert_eq!(summary.max_drawdown, 0.0);
        assert_eq!(summary.sharpe_ratio, 0.0);
        assert_eq!(summary.exposure, 0.0);
    }

    #[test]
    fn exposure_counts_points_in_market() {
        let curve = [
            EquityPoint::new(day(2), 0, 1.0, 100.0, 100.0),
            EquityPoint::new(day(3), 5, 1.0, 100.0, 100.0),
            EquityPoint::new(day(4), 5, 1.0, 100.0, 100.0),
            EquityPoint::new(day(5), 0, 1.0, 100.0, 100.0),
        ];
        assert_relative_eq!(calculate_exposure(&curve), 50.0);
    }

    #[test]
    fn summary_table_has_a_row_per_metric() {
        let summary = SummaryMetrics::from_backtest(&[], &[], &config(1_000.0), None);
        assert_eq!(summary.to_table().len(), 16);
    }
}
