pub mod backtest;
pub mod execution;

pub use backtest::{
    backtest_bars, run_backtest, run_backtest_with_rng, BacktestResult, BacktestWarning,
};
pub use execution::{Execution, ExecutionEngine, Trade, TradeSide};
