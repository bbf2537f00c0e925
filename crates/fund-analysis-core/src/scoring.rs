use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::error::FundAnalysisError;
use crate::factors::FactorSet;
use crate::types::{with_metadata, ComputationOutput};
use crate::FundAnalysisResult;

// ---------------------------------------------------------------------------
// Normalisation bounds and style thresholds
// ---------------------------------------------------------------------------

/// Worst drawdown considered for min-max scaling.
pub const DRAWDOWN_FLOOR: Decimal = dec!(-0.5);
/// Highest volatility considered for min-max scaling.
pub const VOLATILITY_CEILING: Decimal = dec!(0.5);
/// Sharpe ratio scaling range.
pub const SHARPE_MIN: Decimal = dec!(-1);
pub const SHARPE_MAX: Decimal = dec!(3);

/// Growth style: annualised return and volatility both elevated.
pub const GROWTH_RETURN_FLOOR: Decimal = dec!(0.15);
pub const GROWTH_VOLATILITY_FLOOR: Decimal = dec!(0.25);
/// Value style: low volatility with steady positive periods.
pub const VALUE_VOLATILITY_CEILING: Decimal = dec!(0.15);
pub const VALUE_CONSISTENCY_FLOOR: Decimal = dec!(0.55);

const WEIGHT_SUM_EPSILON: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Investment style label derived from factor thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundStyle {
    Growth,
    Value,
    Balanced,
}

impl fmt::Display for FundStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FundStyle::Growth => "growth",
            FundStyle::Value => "value",
            FundStyle::Balanced => "balanced",
        };
        write!(f, "{}", label)
    }
}

/// Per-factor weights for the composite score. Renormalised to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub return_1y: Decimal,
    pub sharpe_ratio: Decimal,
    pub max_drawdown: Decimal,
    pub volatility: Decimal,
    pub consistency: Decimal,
}

impl Default for FactorWeights {
    fn default() -> Self {
        FactorWeights {
            return_1y: dec!(0.25),
            sharpe_ratio: dec!(0.25),
            max_drawdown: dec!(0.20),
            volatility: dec!(0.15),
            consistency: dec!(0.15),
        }
    }
}

impl FactorWeights {
    pub fn sum(&self) -> Decimal {
        self.return_1y + self.sharpe_ratio + self.max_drawdown + self.volatility + self.consistency
    }

    /// Weights scaled so they sum to 1. Fails when the sum is not positive
    /// or any weight is negative.
    pub fn normalized(&self) -> FundAnalysisResult<FactorWeights> {
        for (name, w) in [
            ("return_1y", self.return_1y),
            ("sharpe_ratio", self.sharpe_ratio),
            ("max_drawdown", self.max_drawdown),
            ("volatility", self.volatility),
            ("consistency", self.consistency),
        ] {
            if w < Decimal::ZERO {
                return Err(FundAnalysisError::InvalidInput {
                    field: "factor_weights".into(),
                    reason: format!("{} weight {} is negative", name, w),
                });
            }
        }
        let total = self.sum();
        if total <= Decimal::ZERO {
            return Err(FundAnalysisError::InvalidInput {
                field: "factor_weights".into(),
                reason: format!("weights sum to {}, expected a positive total", total),
            });
        }
        Ok(FactorWeights {
            return_1y: self.return_1y / total,
            sharpe_ratio: self.sharpe_ratio / total,
            max_drawdown: self.max_drawdown / total,
            volatility: self.volatility / total,
            consistency: self.consistency / total,
        })
    }
}

/// Input to composite scoring for a single fund.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringInput {
    pub factors: FactorSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<FactorWeights>,
}

/// Composite score and style label for one fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundScore {
    /// Weighted combination of normalised factors, in [0, 1].
    pub composite_score: Decimal,
    pub style: FundStyle,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a fund from its factor set.
///
/// Factors are min-max scaled against fixed documented bounds (not against a
/// peer population), oriented so that 1 is always favourable, and combined
/// with the configured weights.
pub fn score_fund(input: &ScoringInput) -> FundAnalysisResult<ComputationOutput<FundScore>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let weights = match input.weights {
        Some(ref w) => {
            let normalized = w.normalized()?;
            if (w.sum() - Decimal::ONE).abs() > WEIGHT_SUM_EPSILON {
                warnings.push(format!(
                    "factor weights summed to {}; renormalised to 1",
                    w.sum()
                ));
            }
            normalized
        }
        None => FactorWeights::default(),
    };

    let score = FundScore {
        composite_score: composite_score(&input.factors, &weights),
        style: classify_style(&input.factors),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Bound Normalised Composite Scoring",
        &serde_json::json!({
            "factor_weights": weights,
            "drawdown_floor": DRAWDOWN_FLOOR.to_string(),
            "volatility_ceiling": VOLATILITY_CEILING.to_string(),
            "sharpe_range": [SHARPE_MIN.to_string(), SHARPE_MAX.to_string()],
        }),
        warnings,
        elapsed,
        score,
    ))
}

/// Weighted composite of normalised factor values, in [0, 1]. `weights` must
/// already sum to 1.
pub(crate) fn composite_score(factors: &FactorSet, weights: &FactorWeights) -> Decimal {
    let return_score = clamp01(factors.return_1y);
    let sharpe_score = clamp01((factors.sharpe_ratio - SHARPE_MIN) / (SHARPE_MAX - SHARPE_MIN));
    // Negative-direction factors are oriented so 1 means full drawdown
    // control / minimal volatility.
    let drawdown_score = clamp01((factors.max_drawdown - DRAWDOWN_FLOOR) / -DRAWDOWN_FLOOR);
    let volatility_score = clamp01(Decimal::ONE - factors.volatility / VOLATILITY_CEILING);
    let consistency_score = clamp01(factors.consistency);

    weights.return_1y * return_score
        + weights.sharpe_ratio * sharpe_score
        + weights.max_drawdown * drawdown_score
        + weights.volatility * volatility_score
        + weights.consistency * consistency_score
}

/// Deterministic style classification, evaluated in fixed priority order
/// Growth, then Value, then Balanced.
pub fn classify_style(factors: &FactorSet) -> FundStyle {
    if factors.return_1y > GROWTH_RETURN_FLOOR && factors.volatility > GROWTH_VOLATILITY_FLOOR {
        FundStyle::Growth
    } else if factors.volatility < VALUE_VOLATILITY_CEILING
        && factors.consistency > VALUE_CONSISTENCY_FLOOR
    {
        FundStyle::Value
    } else {
        FundStyle::Balanced
    }
}

fn clamp01(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE)
}
