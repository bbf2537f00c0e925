use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fund_analysis_core::optimizer::{self, OptimizeInput};

use crate::input;

/// Arguments for portfolio weight optimization
#[derive(Args)]
pub struct OptimizeArgs {
    /// Path to JSON input file (OptimizeInput shape)
    #[arg(long)]
    pub input: Option<String>,

    /// Override the risk tolerance from the input file (0 to 1)
    #[arg(long)]
    pub risk_tolerance: Option<Decimal>,
}

pub fn run_optimize(args: OptimizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut opt_input: OptimizeInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for optimization".into());
    };

    if let Some(tolerance) = args.risk_tolerance {
        opt_input.risk_tolerance = tolerance;
    }

    let result = optimizer::optimize_weights(&opt_input)?;
    Ok(serde_json::to_value(result)?)
}
