//a Rust-based moving-average backtesting engine over synthetic price history

pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod portfolio;
pub mod report;
pub mod strategy;

pub use engine::{backtest_bars, run_backtest, run_backtest_with_rng};

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        BacktestConfig, BacktestRequest, ConfigError, PositionSizing, StrategyType,
    };
    pub use crate::data::{PriceBar, PriceSeriesGenerator};
    pub use crate::engine::{
        backtest_bars, run_backtest, run_backtest_with_rng, BacktestResult, BacktestWarning,
        Execution, ExecutionEngine, Trade, TradeSide,
    };
    pub use crate::metrics::{pair_trades, EquityPoint, RoundTrip, SummaryMetrics};
    pub use crate::portfolio::{Account, Position, PositionSizer};
    pub use crate::report::ReportError;
    pub use crate::strategy::{sma_crossover::SmaCrossoverStrategy, sma_series, Signal, Strategy};
}
