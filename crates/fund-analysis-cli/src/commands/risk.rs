use clap::Args;
use serde_json::Value;

use fund_analysis_core::orchestrator::{self, RiskReportInput};
use fund_analysis_core::risk::assessment::{self, RawRiskMetrics};
use fund_analysis_core::risk::stress::{self, StressInput};
use fund_analysis_core::types::RiskMetrics;

use crate::input;

/// Arguments for the full portfolio risk report
#[derive(Args)]
pub struct RiskArgs {
    /// Path to JSON input file (RiskReportInput shape)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for threshold assessment of raw metrics
#[derive(Args)]
pub struct AssessArgs {
    /// Path to JSON input file (RawRiskMetrics shape)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for portfolio stress testing
#[derive(Args)]
pub struct StressArgs {
    /// Path to JSON input file (StressInput shape)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let risk_input: RiskReportInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for the risk report".into());
    };

    let result = orchestrator::assess_portfolio_risk(&risk_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_assess(args: AssessArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: RawRiskMetrics = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for assessment".into());
    };

    let metrics = RiskMetrics::from_raw(&raw)?;
    let result = assessment::assess_risk(&metrics)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_stress(args: StressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let stress_input: StressInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for stress testing".into());
    };

    let result = stress::run_stress_test(&stress_input)?;
    Ok(serde_json::to_value(result)?)
}
