use anyhow::{Context, Result};
use backsim::prelude::*;
use backsim::report;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "backsim")]
#[command(about = "A moving-average backtesting engine over synthetic prices", long_about = None)]
struct Cli {
    //log level, overridden by BACKSIM_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    //log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a backtest
    Run {
        //json request file; flags override its fields
        #[arg(long)]
        config: Option<PathBuf>,

        //ticker label (defaults to AAPL)
        #[arg(long)]
        ticker: Option<String>,

        //start date (YYYY-MM-DD), defaults to one year before end
        #[arg(long)]
        start: Option<String>,

        //end date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        end: Option<String>,

        //initial cash
        #[arg(long)]
        initial_cash: Option<f64>,

        //commission rate per leg, eg 0.001
        #[arg(long)]
        commission: Option<f64>,

        //position sizing (percentage, allin, fixed, shares)
        #[arg(long)]
        sizing: Option<String>,

        //percent, cash amount or share count depending on sizing
        #[arg(long)]
        size_value: Option<f64>,

        //strategy (sma)
        #[arg(long)]
        strategy: Option<String>,

        //seed for the synthetic price series
        #[arg(long)]
        seed: Option<u64>,

        //output options
        //output path for trades csv
        #[arg(long)]
        output_trades_csv: Option<PathBuf>,

        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,

        //output path for the full result as json
        #[arg(long)]
        output_json: Option<PathBuf>,
    },

    //write a request file with every default filled in
    InitConfig {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, &cli.log_format)?;

    match cli.command {
        Commands::Run {
            config,
            ticker,
            start,
            end,
            initial_cash,
            commission,
            sizing,
            size_value,
            strategy,
            seed,
            output_trades_csv,
            output_equity_csv,
            output_json,
        } => {
            let flags = BacktestRequest {
                ticker,
                start_date: start,
                end_date: end,
                initial_cash,
                commission_rate: commission,
                position_sizing: sizing,
                position_size_value: size_value,
                strategy,
                seed,
            };

            let request = match config {
                Some(path) => flags.or(BacktestRequest::from_json_file(&path)?),
                None => flags,
            };

            run(
                request,
                output_trades_csv,
                output_equity_csv,
                output_json,
            )?;
        }
        Commands::InitConfig { path } => {
            init_config(&path)?;
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str, log_format: &str) -> Result<()> {
    let filter = std::env::var("BACKSIM_LOG").unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| anyhow::anyhow!("invalid log filter: {err}"))?;

    if log_format.trim().eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn run(
    request: BacktestRequest,
    output_trades_csv: Option<PathBuf>,
    output_equity_csv: Option<PathBuf>,
    output_json: Option<PathBuf>,
) -> Result<()> {
    let config = request
        .resolve(today())
        .context("Invalid backtest configuration")?;

    println!("Backsim Backtesting Engine");
    println!("==========================\n");
    println!("Ticker: {}", config.ticker);
    println!("Period: {} to {}", config.start_date, config.end_date);
    println!("Initial cash: ${:.2}", config.initial_cash);
    println!("Commission: {:.3}%", config.commission_rate * 100.0);
    println!(
        "Position sizing: {:?} ({})\n",
        config.position_sizing, config.position_size_value
    );

    let result = run_backtest(&config)?;

    for warning in &result.warnings {
        match warning {
            BacktestWarning::InsufficientData { bars, required } => println!(
                "Warning: only {} trading days in range, {} needed for a signal\n",
                bars, required
            ),
        }
    }

    println!("Backtest Results");
    println!("================\n");
    result.summary.pretty_print_table();

    if !result.trades.is_empty() {
        println!("\nTrades");
        report::print_trades_table(&result.trades);
    }

    //save outputs if requested
    if let Some(path) = output_trades_csv {
        report::save_trades_csv(&result.trades, &path)
            .with_context(|| format!("Failed to write trades to {:?}", path))?;
        println!("\nTrades saved to {:?}", path);
    }

    if let Some(path) = output_equity_csv {
        report::save_equity_csv(&result.equity_curve, &path)
            .with_context(|| format!("Failed to write equity curve to {:?}", path))?;
        println!("Equity curve saved to {:?}", path);
    }

    if let Some(path) = output_json {
        report::save_result_json(&result, &path)
            .with_context(|| format!("Failed to write result to {:?}", path))?;
        println!("Result saved to {:?}", path);
    }

    Ok(())
}

fn init_config(path: &Path) -> Result<()> {
    let config = BacktestRequest::default().resolve(today())?;

    let request = BacktestRequest {
        ticker: Some(config.ticker),
        start_date: Some(config.start_date.to_string()),
        end_date: Some(config.end_date.to_string()),
        initial_cash: Some(config.initial_cash),
        commission_rate: Some(config.commission_rate),
        position_sizing: Some("percentage".to_string()),
        position_size_value: Some(config.position_size_value),
        strategy: Some("sma".to_string()),
        seed: None,
    };

    request.to_json_file(path)?;
    println!("Config written to {:?}", path);
    Ok(())
}
