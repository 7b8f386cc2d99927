pub mod summary;
pub mod timeseries;

pub use summary::{pair_trades, RoundTrip, SummaryMetrics};
pub use timeseries::{max_drawdown, sharpe_ratio, EquityPoint};
