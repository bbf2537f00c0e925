use clap::{Args, ValueEnum};
use serde_json::Value;

use fund_analysis_core::orchestrator::{self, AnalysisRequest, RankingInput, RankingKey};

use crate::input;

/// Arguments for the full analysis pipeline
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON input file (AnalysisRequest shape, tagged by "mode")
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for universe ranking
#[derive(Args)]
pub struct RankArgs {
    /// Path to JSON input file (RankingInput shape)
    #[arg(long)]
    pub input: Option<String>,

    /// Override the sort key from the input file
    #[arg(long)]
    pub key: Option<RankKey>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RankKey {
    CompositeScore,
    SharpeRatio,
    Return1y,
    DrawdownControl,
}

impl From<RankKey> for RankingKey {
    fn from(key: RankKey) -> Self {
        match key {
            RankKey::CompositeScore => RankingKey::CompositeScore,
            RankKey::SharpeRatio => RankingKey::SharpeRatio,
            RankKey::Return1y => RankingKey::Return1Y,
            RankKey::DrawdownControl => RankingKey::DrawdownControl,
        }
    }
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: AnalysisRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for analysis".into());
    };

    let result = orchestrator::analyze(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rank(args: RankArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut rank_input: RankingInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for ranking".into());
    };

    if let Some(key) = args.key {
        rank_input.key = key.into();
    }

    let result = orchestrator::rank_funds(&rank_input)?;
    Ok(serde_json::to_value(result)?)
}
