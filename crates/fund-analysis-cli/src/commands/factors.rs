use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fund_analysis_core::orchestrator::{self, FundAnalysisInput};
use fund_analysis_core::types::{AnalysisConfig, ReturnSeries};

use crate::commands::parse_frequency;
use crate::input;

/// Arguments for single-fund factor scoring
#[derive(Args)]
pub struct FactorsArgs {
    /// Path to JSON input file (FundAnalysisInput shape)
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated periodic returns (e.g. "0.05,0.02,-0.01,0.03")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<Decimal>>,

    /// Fund code attached to inline returns
    #[arg(long, default_value = "FUND")]
    pub fund_code: String,

    /// Risk-free rate (annualised)
    #[arg(long, default_value = "0")]
    pub risk_free_rate: Decimal,

    /// Return frequency for annualisation: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "daily")]
    pub frequency: String,
}

pub fn run_factors(args: FactorsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let fa_input: FundAnalysisInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(ref rets) = args.returns {
        FundAnalysisInput {
            fund_code: args.fund_code.clone(),
            returns: ReturnSeries::new(rets.clone())?,
            config: AnalysisConfig {
                frequency: parse_frequency(&args.frequency)?,
                risk_free_rate: args.risk_free_rate,
            },
            factor_weights: None,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("Provide --returns or --input <file.json> or pipe JSON via stdin".into());
    };

    let result = orchestrator::analyze_fund(&fa_input)?;
    Ok(serde_json::to_value(result)?)
}
