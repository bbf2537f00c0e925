use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FundAnalysisError;
use crate::stats;
use crate::types::{with_metadata, AnalysisConfig, ComputationOutput, Rate, ReturnSeries};
use crate::FundAnalysisResult;

/// Minimum number of return observations for factor computation.
pub const MIN_PERIODS: usize = 2;

/// Input to factor computation for a single fund.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorInput {
    pub returns: ReturnSeries,
    #[serde(default)]
    pub config: AnalysisConfig,
}

/// The fixed factor set computed for one fund at one evaluation point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSet {
    /// Trailing one-year return, annualised from the available window.
    pub return_1y: Rate,
    /// (return_1y - risk-free rate) / volatility; 0 when volatility is 0.
    pub sharpe_ratio: Decimal,
    /// Largest peak-to-trough NAV decline, always <= 0.
    pub max_drawdown: Rate,
    /// Annualised sample standard deviation of periodic returns.
    pub volatility: Rate,
    /// Fraction of periods with a positive return, in [0, 1].
    pub consistency: Decimal,
    /// True when fewer than a full year of periods was available for
    /// return_1y, which is then annualised from the partial window.
    pub partial_window: bool,
}

/// Compute the factor set for one fund's return series.
pub fn compute_factors(input: &FactorInput) -> FundAnalysisResult<ComputationOutput<FactorSet>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let factors = factor_set(&input.returns, &input.config, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Multi-Factor Fund Profile (return, Sharpe, drawdown, volatility, consistency)",
        &serde_json::json!({
            "observations": input.returns.len(),
            "frequency": format!("{:?}", input.config.frequency),
            "risk_free_rate": input.config.risk_free_rate.to_string(),
        }),
        warnings,
        elapsed,
        factors,
    ))
}

/// Core factor computation shared with the orchestrator. Appends degradation
/// notes (partial window) to `warnings`.
pub(crate) fn factor_set(
    series: &ReturnSeries,
    config: &AnalysisConfig,
    warnings: &mut Vec<String>,
) -> FundAnalysisResult<FactorSet> {
    let returns = series.returns();
    let n = returns.len();

    if n < MIN_PERIODS {
        return Err(FundAnalysisError::InsufficientData(format!(
            "at least {} return observations required, got {}",
            MIN_PERIODS, n
        )));
    }

    let periods_per_year = config.frequency.periods_per_year();
    let year_window = config.frequency.period_count();

    // return_1y policy: annualise the mean of the trailing one-year window,
    // or of all available periods when the history is shorter than a year.
    let partial_window = n < year_window;
    let window = if partial_window {
        returns
    } else {
        &returns[n - year_window..]
    };
    let return_1y = stats::annualized_mean_return(window, periods_per_year);
    if partial_window {
        warnings.push(format!(
            "only {} of {} periods available; return_1y annualised from the partial window",
            n, year_window
        ));
    }

    let volatility = stats::annualized_volatility(returns, periods_per_year);
    let sharpe_ratio = stats::sharpe_ratio(return_1y, config.risk_free_rate, volatility);
    let max_drawdown = stats::max_drawdown(returns);

    let positive = returns.iter().filter(|r| **r > Decimal::ZERO).count();
    let consistency = Decimal::from(positive as i64) / Decimal::from(n as i64);

    Ok(FactorSet {
        return_1y,
        sharpe_ratio,
        max_drawdown,
        volatility,
        consistency,
        partial_window,
    })
}
