use crate::config::{BacktestConfig, ConfigError, StrategyType};
use crate::data::{PriceBar, PriceSeriesGenerator};
use crate::engine::execution::{ExecutionEngine, Trade};
use crate::metrics::{EquityPoint, SummaryMetrics};
use crate::portfolio::PositionSizer;
use crate::strategy::sma_crossover::SmaCrossoverStrategy;
use crate::strategy::Strategy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

//non-fatal conditions observed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BacktestWarning {
    //too few bars for any signal to be evaluated
    InsufficientData { bars: usize, required: usize },
}

//result of a backtest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub config: BacktestConfig,
    pub bars: Vec<PriceBar>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub summary: SummaryMetrics,
    pub warnings: Vec<BacktestWarning>,
}

//validates the config, generates a series from its seed and runs it
pub fn run_backtest(config: &BacktestConfig) -> Result<BacktestResult, ConfigError> {
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    run_backtest_with_rng(config, &mut rng)
}

//same as run_backtest but draws the series from a caller-supplied stream
pub fn run_backtest_with_rng<R: Rng + ?Sized>(
    config: &BacktestConfig,
    rng: &mut R,
) -> Result<BacktestResult, ConfigError> {
    config.validate()?;
    let bars = PriceSeriesGenerator::new(config.start_date, config.end_date).generate(rng);
    backtest_bars(config, bars)
}

//signal -> execute -> analyze over an existing series
pub fn backtest_bars(
    config: &BacktestConfig,
    bars: Vec<PriceBar>,
) -> Result<BacktestResult, ConfigError> {
    config.validate()?;

    let strategy = match config.strategy {
        StrategyType::SmaCrossover => SmaCrossoverStrategy::standard(&bars),
    };

    tracing::info!(
        ticker = %config.ticker,
        strategy = strategy.name(),
        bars = bars.len(),
        start = %config.start_date,
        end = %config.end_date,
        "running backtest"
    );

    let mut warnings = Vec::new();
    if bars.len() <= strategy.warmup() {
        tracing::warn!(
            bars = bars.len(),
            required = strategy.warmup() + 1,
            "insufficient data, no signals will be evaluated"
        );
        warnings.push(BacktestWarning::InsufficientData {
            bars: bars.len(),
            required: strategy.warmup() + 1,
        });
    }

    let engine = ExecutionEngine::new(
        PositionSizer::new(config.position_sizing, config.position_size_value),
        config.commission_rate,
        config.initial_cash,
    );
    let execution = engine.execute(&bars, &strategy);

    let final_close = bars.last().map(|bar| bar.close);
    let summary = SummaryMetrics::from_backtest(
        &execution.trades,
        &execution.equity_curve,
        config,
        final_close,
    );

    tracing::info!(
        trades = execution.trades.len(),
        final_value = summary.final_value,
        total_return_pct = summary.total_return_pct,
        "backtest finished"
    );

    Ok(BacktestResult {
        config: config.clone(),
        bars,
        trades: execution.trades,
        equity_curve: execution.equity_curve,
        summary,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn invalid_config_fails_before_generation() {
        let config = BacktestConfig::new("AAPL", date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(
            run_backtest(&config),
            Err(ConfigError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let config = BacktestConfig::new("AAPL", date(2023, 1, 1), date(2023, 12, 31)).with_seed(5);
        let a = run_backtest(&config).unwrap();
        let b = run_backtest(&config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn short_range_warns() {
        let config = BacktestConfig::new("AAPL", date(2024, 1, 1), date(2024, 1, 10)).with_seed(1);
        let result = run_backtest(&config).unwrap();

        assert_eq!(
            result.warnings,
            vec![BacktestWarning::InsufficientData {
                bars: 8,
                required: 31
            }]
        );
        assert!(result.trades.is_empty());
    }

    #[test]
    fn weekend_only_range_completes() {
        let config = BacktestConfig::new("AAPL", date(2024, 1, 6), date(2024, 1, 7)).with_seed(1);
        let result = run_backtest(&config).unwrap();

        assert!(result.bars.is_empty());
        assert!(result.equity_curve.is_empty());
        assert_eq!(result.summary.final_value, config.initial_cash);
        assert_eq!(result.summary.max_drawdown, 0.0);
    }
}
