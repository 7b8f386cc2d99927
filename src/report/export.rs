use crate::engine::{BacktestResult, Trade, TradeSide};
use crate::metrics::EquityPoint;
use chrono::NaiveDate;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//flat csv row for a trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: String,
    pub date: NaiveDate,
    pub price: f64,
    pub shares: u64,
    pub cash_value: f64,
}

impl From<&Trade> for TradeRecord {
    fn from(trade: &Trade) -> Self {
        TradeRecord {
            side: side_label(trade.side).to_string(),
            date: trade.date,
            price: trade.price,
            shares: trade.shares,
            cash_value: trade.cash_value,
        }
    }
}

//flat csv row for an equity point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityRecord {
    pub date: NaiveDate,
    pub shares: u64,
    pub price: f64,
    pub total_value: f64,
    pub drawdown: f64,
}

impl From<&EquityPoint> for EquityRecord {
    fn from(point: &EquityPoint) -> Self {
        EquityRecord {
            date: point.date,
            shares: point.shares,
            price: point.price,
            total_value: point.total_value,
            drawdown: point.drawdown(),
        }
    }
}

pub fn side_label(side: TradeSide) -> &'static str {
    match side {
        TradeSide::Buy => "BUY",
        TradeSide::Sell => "SELL",
    }
}

//writes the trade log as csv
pub fn write_trades_csv<W: Write>(trades: &[Trade], writer: W) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(writer);
    for trade in trades {
        writer.serialize(TradeRecord::from(trade))?;
    }
    writer.flush()?;
    Ok(())
}

//writes the equity curve as csv
pub fn write_equity_csv<W: Write>(
    equity_curve: &[EquityPoint],
    writer: W,
) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(writer);
    for point in equity_curve {
        writer.serialize(EquityRecord::from(point))?;
    }
    writer.flush()?;
    Ok(())
}

//writes the whole result as pretty json
pub fn write_result_json<W: Write>(result: &BacktestResult, writer: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, result)?;
    Ok(())
}

pub fn save_trades_csv(trades: &[Trade], path: &Path) -> Result<(), ReportError> {
    write_trades_csv(trades, std::fs::File::create(path)?)
}

pub fn save_equity_csv(equity_curve: &[EquityPoint], path: &Path) -> Result<(), ReportError> {
    write_equity_csv(equity_curve, std::fs::File::create(path)?)
}

pub fn save_result_json(result: &BacktestResult, path: &Path) -> Result<(), ReportError> {
    write_result_json(result, std::io::BufWriter::new(std::fs::File::create(path)?))
}

//tabular trade listing
pub fn trades_table(trades: &[Trade]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("#"),
        Cell::new("Type"),
        Cell::new("Date"),
        Cell::new("Price"),
        Cell::new("Shares"),
        Cell::new("Value"),
    ]));

    for (index, trade) in trades.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&format!("{}", index + 1)),
            Cell::new(side_label(trade.side)),
            Cell::new(&trade.date.to_string()),
            Cell::new(&format!("${:.2}", trade.price)),
            Cell::new(&format!("{}", trade.shares)),
            Cell::new(&format!("${:.2}", trade.cash_value)),
        ]));
    }

    table
}

pub fn print_trades_table(trades: &[Trade]) {
    trades_table(trades).printstd();
}
