use clap::Args;
use serde_json::Value;

use fund_analysis_core::backtest::{self, BacktestInput};

use crate::input;

/// Arguments for portfolio backtesting
#[derive(Args)]
pub struct BacktestArgs {
    /// Path to JSON input file (BacktestInput shape)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_backtest(args: BacktestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bt_input: BacktestInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for backtesting".into());
    };

    let result = backtest::run_backtest(&bt_input)?;
    Ok(serde_json::to_value(result)?)
}
