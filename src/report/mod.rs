pub mod export;

pub use export::{
    print_trades_table, save_equity_csv, save_result_json, save_trades_csv, trades_table,
    write_equity_csv, write_result_json, write_trades_csv, ReportError,
};
