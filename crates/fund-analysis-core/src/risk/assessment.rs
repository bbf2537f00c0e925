use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::error::FundAnalysisError;
use crate::types::{with_metadata, ComputationOutput, RiskMetrics};
use crate::FundAnalysisResult;

// ---------------------------------------------------------------------------
// Threshold constants
// ---------------------------------------------------------------------------

/// Drawdown at or beyond which the portfolio is high risk.
pub const HIGH_DRAWDOWN_LIMIT: Decimal = dec!(-0.25);
/// Annualised volatility at or beyond which the portfolio is high risk.
pub const HIGH_VOLATILITY_LIMIT: Decimal = dec!(0.30);
/// Drawdown at or beyond which the portfolio is at least medium risk.
pub const ELEVATED_DRAWDOWN_LIMIT: Decimal = dec!(-0.20);
/// Annualised volatility at or beyond which the portfolio is at least medium risk.
pub const ELEVATED_VOLATILITY_LIMIT: Decimal = dec!(0.25);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        write!(f, "{}", label)
    }
}

/// Risk level plus the alerts that triggered it, in fixed rule order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub alerts: Vec<String>,
}

/// Untyped metrics as delivered by an external caller; the non-finite guard
/// lives in the conversion to `RiskMetrics`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawRiskMetrics {
    pub total_return: f64,
    pub annual_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl RiskMetrics {
    /// Convert raw float metrics, rejecting NaN and infinities. A non-finite
    /// value signals an upstream computation defect, not user error.
    pub fn from_raw(raw: &RawRiskMetrics) -> FundAnalysisResult<RiskMetrics> {
        Ok(RiskMetrics {
            total_return: finite_decimal("total_return", raw.total_return)?,
            annual_return: finite_decimal("annual_return", raw.annual_return)?,
            volatility: finite_decimal("volatility", raw.volatility)?,
            sharpe_ratio: finite_decimal("sharpe_ratio", raw.sharpe_ratio)?,
            max_drawdown: finite_decimal("max_drawdown", raw.max_drawdown)?,
        })
    }
}

fn finite_decimal(field: &str, value: f64) -> FundAnalysisResult<Decimal> {
    if !value.is_finite() {
        return Err(FundAnalysisError::RiskAssessment(format!(
            "{} is not finite ({})",
            field, value
        )));
    }
    Decimal::try_from(value).map_err(|e| {
        FundAnalysisError::RiskAssessment(format!("{} is not representable: {}", field, e))
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Assess portfolio metrics against the fixed risk thresholds.
///
/// Alert rules run in a fixed order (drawdown, volatility, Sharpe) so the
/// output is reproducible for identical inputs. Any constructible metrics
/// record assesses successfully.
pub fn assess_risk(metrics: &RiskMetrics) -> FundAnalysisResult<ComputationOutput<RiskAssessment>> {
    let start = Instant::now();

    let mut alerts: Vec<String> = Vec::new();
    if metrics.max_drawdown <= HIGH_DRAWDOWN_LIMIT {
        alerts.push(format!(
            "max drawdown {:.4} breaches the {} limit",
            metrics.max_drawdown, HIGH_DRAWDOWN_LIMIT
        ));
    }
    if metrics.volatility >= HIGH_VOLATILITY_LIMIT {
        alerts.push(format!(
            "annualised volatility {:.4} exceeds the {} limit",
            metrics.volatility, HIGH_VOLATILITY_LIMIT
        ));
    }
    if metrics.sharpe_ratio < Decimal::ZERO {
        alerts.push(format!(
            "risk-adjusted return is negative (Sharpe {:.4})",
            metrics.sharpe_ratio
        ));
    }

    let risk_level = if metrics.max_drawdown <= HIGH_DRAWDOWN_LIMIT
        || metrics.volatility >= HIGH_VOLATILITY_LIMIT
    {
        RiskLevel::High
    } else if metrics.max_drawdown <= ELEVATED_DRAWDOWN_LIMIT
        || metrics.volatility >= ELEVATED_VOLATILITY_LIMIT
        || metrics.sharpe_ratio < Decimal::ZERO
    {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let assessment = RiskAssessment { risk_level, alerts };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Threshold Risk Assessment",
        &serde_json::json!({
            "high_drawdown_limit": HIGH_DRAWDOWN_LIMIT.to_string(),
            "high_volatility_limit": HIGH_VOLATILITY_LIMIT.to_string(),
            "elevated_drawdown_limit": ELEVATED_DRAWDOWN_LIMIT.to_string(),
            "elevated_volatility_limit": ELEVATED_VOLATILITY_LIMIT.to_string(),
        }),
        Vec::new(),
        elapsed,
        assessment,
    ))
}
