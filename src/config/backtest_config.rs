use crate::portfolio::PositionSizer;
use anyhow::Context;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;
pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;
pub const DEFAULT_POSITION_SIZE: f64 = 95.0;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid date range: start ({start}) is after end ({end})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("Invalid {field} date '{value}', expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },
    #[error("Initial cash must be positive, got {0}")]
    NonPositiveCash(f64),
    #[error("Commission rate must be in [0, 1), got {0}")]
    InvalidCommission(f64),
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

//strategy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyType {
    SmaCrossover,
}

impl StrategyType {
    //parse strategy type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sma" | "sma_crossover" => Some(StrategyType::SmaCrossover),
            _ => None,
        }
    }
}

//position sizing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSizing {
    //percent of available cash
    Percentage,
    //all available cash
    AllIn,
    //fixed cash amount per entry
    FixedAmount,
    //fixed share count per entry
    FixedShares,
}

impl PositionSizing {
    //parse sizing policy from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "percentage" | "percent" => Some(PositionSizing::Percentage),
            "allin" | "all_in" => Some(PositionSizing::AllIn),
            "fixed" | "fixed_amount" => Some(PositionSizing::FixedAmount),
            "shares" | "fixed_shares" => Some(PositionSizing::FixedShares),
            _ => None,
        }
    }
}

//validated configuration for a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_cash: f64,
    pub commission_rate: f64,
    pub position_sizing: PositionSizing,
    pub position_size_value: f64,
    pub strategy: StrategyType,

    //seed for the price series; None draws one from entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BacktestConfig {
    //creates a config with boundary defaults for everything but the dates
    pub fn new(ticker: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        BacktestConfig {
            ticker: ticker.into(),
            start_date,
            end_date,
            initial_cash: DEFAULT_INITIAL_CASH,
            commission_rate: DEFAULT_COMMISSION_RATE,
            position_sizing: PositionSizing::Percentage,
            position_size_value: DEFAULT_POSITION_SIZE,
            strategy: StrategyType::SmaCrossover,
            seed: None,
        }
    }

    pub fn with_initial_cash(mut self, initial_cash: f64) -> Self {
        self.initial_cash = initial_cash;
        self
    }

    pub fn with_commission_rate(mut self, commission_rate: f64) -> Self {
        self.commission_rate = commission_rate;
        self
    }

    pub fn with_sizing(mut self, sizing: PositionSizing, value: f64) -> Self {
        self.position_sizing = sizing;
        self.position_size_value = value;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    //checks the invariants the numeric core relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }

        if !(self.initial_cash.is_finite() && self.initial_cash > 0.0) {
            return Err(ConfigError::NonPositiveCash(self.initial_cash));
        }

        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(ConfigError::InvalidCommission(self.commission_rate));
        }

        Ok(())
    }
}

//raw run request as handed over by a front end
//every field is optional; resolve() fills defaults and validates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestRequest {
    pub ticker: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub initial_cash: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub commission_rate: Option<f64>,
    pub position_sizing: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub position_size_value: Option<f64>,
    pub strategy: Option<String>,
    pub seed: Option<u64>,
}

impl BacktestRequest {
    //applies boundary defaults and validates
    //`today` stands in for the wall clock when no date range is supplied
    pub fn resolve(&self, today: NaiveDate) -> Result<BacktestConfig, ConfigError> {
        let ticker = self
            .ticker
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TICKER)
            .to_string();

        let start = parse_optional_date("start", self.start_date.as_deref())?;
        let end = parse_optional_date("end", self.end_date.as_deref())?;
        let (start_date, end_date) = match (start, end) {
            (Some(start), Some(end)) => (start, end),
            (Some(start), None) => (start, today),
            (None, Some(end)) => (one_year_before(end), end),
            (None, None) => (one_year_before(today), today),
        };

        let strategy = match self.strategy.as_deref().map(str::trim) {
            None | Some("") => StrategyType::SmaCrossover,
            Some(name) => StrategyType::parse(name)
                .ok_or_else(|| ConfigError::UnknownStrategy(name.to_string()))?,
        };

        let size_value = numeric_or(self.position_size_value, DEFAULT_POSITION_SIZE);
        let (position_sizing, position_size_value) = match self.position_sizing.as_deref() {
            None => (PositionSizing::Percentage, size_value),
            Some(name) => match PositionSizing::parse(name) {
                Some(sizing) => (sizing, size_value),
                None => {
                    let fallback = PositionSizer::fallback();
                    tracing::warn!(
                        policy = name,
                        percent = fallback.value,
                        "unrecognized position sizing, falling back to a percentage of cash"
                    );
                    (fallback.policy, fallback.value)
                }
            },
        };

        let config = BacktestConfig {
            ticker,
            start_date,
            end_date,
            initial_cash: numeric_or(self.initial_cash, DEFAULT_INITIAL_CASH),
            commission_rate: numeric_or(self.commission_rate, DEFAULT_COMMISSION_RATE),
            position_sizing,
            position_size_value,
            strategy,
            seed: self.seed,
        };

        config.validate()?;
        Ok(config)
    }

    //load a request from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let request: BacktestRequest = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(request)
    }

    //save a request to a JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }

    //fills every unset field of self from `base`
    pub fn or(self, base: BacktestRequest) -> Self {
        BacktestRequest {
            ticker: self.ticker.or(base.ticker),
            start_date: self.start_date.or(base.start_date),
            end_date: self.end_date.or(base.end_date),
            initial_cash: self.initial_cash.or(base.initial_cash),
            commission_rate: self.commission_rate.or(base.commission_rate),
            position_sizing: self.position_sizing.or(base.position_sizing),
            position_size_value: self.position_size_value.or(base.position_size_value),
            strategy: self.strategy.or(base.strategy),
            seed: self.seed.or(base.seed),
        }
    }
}

//parses a YYYY-MM-DD date; blank counts as absent
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ConfigError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn parse_optional_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, ConfigError> {
    match value {
        Some(raw) if !raw.trim().is_empty() => parse_date(field, raw).map(Some),
        _ => Ok(None),
    }
}

fn one_year_before(date: NaiveDate) -> NaiveDate {
    date.checked_sub_months(Months::new(12))
        .or_else(|| date.checked_sub_signed(chrono::Duration::days(365)))
        .unwrap_or(date)
}

//numbers and numeric strings are kept; anything else reads as absent
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

//absent or NaN values take the default
fn numeric_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| !v.is_nan()).unwrap_or(default)
}
