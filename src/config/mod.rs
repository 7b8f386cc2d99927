pub mod backtest_config;

pub use backtest_config::{
    parse_date, BacktestConfig, BacktestRequest, ConfigError, PositionSizing, StrategyType,
};
