use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FundAnalysisError;
use crate::scoring::FundStyle;
use crate::types::{with_metadata, ComputationOutput, PortfolioWeights};
use crate::FundAnalysisResult;

/// A fund's style label, as produced by the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundStyleTag {
    pub fund_code: String,
    pub style: FundStyle,
}

/// Input to portfolio exposure analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureInput {
    pub weights: PortfolioWeights,
    /// Style labels covering every weighted fund.
    pub styles: Vec<FundStyleTag>,
}

/// Aggregate weight per style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleExposure {
    pub style: FundStyle,
    pub weight: Decimal,
}

/// Portfolio concentration and style exposure summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureAnalysis {
    /// Weight per style in fixed order: growth, value, balanced.
    pub style_exposure: Vec<StyleExposure>,
    /// Largest single-fund weight.
    pub concentration: Decimal,
    /// 1 minus the Herfindahl index of weights; higher is more diversified.
    pub diversification: Decimal,
}

/// Aggregate style exposure, concentration and diversification for a
/// weighted portfolio.
pub fn analyze_exposure(input: &ExposureInput) -> FundAnalysisResult<ComputationOutput<ExposureAnalysis>> {
    let start = Instant::now();

    input.weights.validate()?;

    let mut growth = Decimal::ZERO;
    let mut value = Decimal::ZERO;
    let mut balanced = Decimal::ZERO;
    let mut concentration = Decimal::ZERO;
    let mut herfindahl = Decimal::ZERO;

    for entry in input.weights.entries() {
        concentration = concentration.max(entry.weight);
        herfindahl += entry.weight * entry.weight;

        if entry.weight.is_zero() {
            continue;
        }
        let style = input
            .styles
            .iter()
            .find(|tag| tag.fund_code == entry.fund_code)
            .map(|tag| tag.style)
            .ok_or_else(|| FundAnalysisError::InvalidInput {
                field: "styles".into(),
                reason: format!("no style label for weighted fund {}", entry.fund_code),
            })?;
        match style {
            FundStyle::Growth => growth += entry.weight,
            FundStyle::Value => value += entry.weight,
            FundStyle::Balanced => balanced += entry.weight,
        }
    }

    let analysis = ExposureAnalysis {
        style_exposure: vec![
            StyleExposure { style: FundStyle::Growth, weight: growth },
            StyleExposure { style: FundStyle::Value, weight: value },
            StyleExposure { style: FundStyle::Balanced, weight: balanced },
        ],
        concentration,
        diversification: Decimal::ONE - herfindahl,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Style Exposure and Concentration Analysis",
        &serde_json::json!({ "n_weights": input.weights.len() }),
        Vec::new(),
        elapsed,
        analysis,
    ))
}
