use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FundAnalysisError;
use crate::stats;
use crate::types::{
    with_metadata, AnalysisConfig, ComputationOutput, FundReturns, PortfolioWeights, ReturnSeries,
    RiskMetrics,
};
use crate::FundAnalysisResult;

/// Input to a portfolio backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestInput {
    pub weights: PortfolioWeights,
    /// Return histories; must cover every fund with a nonzero weight.
    pub funds: Vec<FundReturns>,
    #[serde(default)]
    pub config: AnalysisConfig,
}

/// One point on the simulated NAV path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavPoint {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub nav: Decimal,
}

/// Result of a portfolio backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// NAV path starting at exactly 1.0, one point per simulated period plus
    /// the initial point.
    pub nav_path: Vec<NavPoint>,
    pub metrics: RiskMetrics,
    /// Number of simulated periods after alignment.
    pub periods: usize,
}

/// Simulate a portfolio NAV path from fixed initial weights.
///
/// The portfolio period return is the weighted sum of per-fund period returns
/// using the initial weights for every period; weight drift across periods is
/// accepted and not corrected (no rebalancing).
pub fn run_backtest(input: &BacktestInput) -> FundAnalysisResult<ComputationOutput<BacktestResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.weights.validate()?;
    validate_pool(&input.funds)?;

    // Funds actually held: nonzero weight plus its series.
    let mut held: Vec<(Decimal, &ReturnSeries)> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    for entry in input.weights.entries() {
        if entry.weight.is_zero() {
            continue;
        }
        match input.funds.iter().find(|f| f.fund_code == entry.fund_code) {
            Some(f) => held.push((entry.weight, &f.returns)),
            None => missing.push(entry.fund_code.clone()),
        }
    }
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(FundAnalysisError::BacktestInput(format!(
            "no return series for weighted fund(s): {}",
            missing.join(", ")
        )));
    }
    if held.is_empty() {
        return Err(FundAnalysisError::BacktestInput(
            "all weights are zero; nothing to simulate".into(),
        ));
    }

    // Shortest common trailing window.
    let periods = held.iter().map(|(_, s)| s.len()).min().unwrap_or(0);
    if held.iter().any(|(_, s)| s.len() > periods) {
        warnings.push(format!(
            "series truncated to the shortest common trailing window of {} periods",
            periods
        ));
    }
    if periods < 2 {
        warnings.push(format!(
            "only {} common period(s); volatility and Sharpe degenerate to 0",
            periods
        ));
    }
    let aligned: Vec<(Decimal, ReturnSeries)> = held
        .iter()
        .map(|(w, s)| (*w, s.trailing(periods)))
        .collect();

    // Weighted portfolio returns at fixed initial weights.
    let portfolio_returns: Vec<Decimal> = (0..periods)
        .map(|t| {
            aligned
                .iter()
                .map(|(w, s)| *w * s.returns()[t])
                .sum::<Decimal>()
        })
        .collect();

    // Dates carry through only when every aligned series agrees on them.
    let dates = common_dates(&aligned, periods);

    let navs = stats::nav_path(&portfolio_returns);
    let nav_path: Vec<NavPoint> = navs
        .iter()
        .enumerate()
        .map(|(index, nav)| NavPoint {
            index,
            date: match (index, &dates) {
                (0, _) => None,
                (_, Some(d)) => Some(d[index - 1]),
                (_, None) => None,
            },
            nav: *nav,
        })
        .collect();

    let periods_per_year = input.config.frequency.periods_per_year();
    let total_return = navs[navs.len() - 1] - Decimal::ONE;
    let volatility = stats::annualized_volatility(&portfolio_returns, periods_per_year);
    let metrics = RiskMetrics {
        total_return,
        annual_return: stats::annualize_total_return(total_return, periods, periods_per_year),
        volatility,
        sharpe_ratio: stats::sharpe_ratio(
            stats::annualized_mean_return(&portfolio_returns, periods_per_year),
            input.config.risk_free_rate,
            volatility,
        ),
        max_drawdown: stats::max_drawdown(&portfolio_returns),
    };

    let result = BacktestResult {
        nav_path,
        metrics,
        periods,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Weight NAV Simulation (no rebalancing)",
        &serde_json::json!({
            "held_funds": aligned.len(),
            "periods": periods,
            "frequency": format!("{:?}", input.config.frequency),
            "risk_free_rate": input.config.risk_free_rate.to_string(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

fn validate_pool(funds: &[FundReturns]) -> FundAnalysisResult<()> {
    let mut codes: Vec<&str> = funds.iter().map(|f| f.fund_code.as_str()).collect();
    codes.sort_unstable();
    for pair in codes.windows(2) {
        if pair[0] == pair[1] {
            return Err(FundAnalysisError::InvalidInput {
                field: "funds".into(),
                reason: format!("duplicate fund code {}", pair[0]),
            });
        }
    }
    Ok(())
}

fn common_dates(aligned: &[(Decimal, ReturnSeries)], periods: usize) -> Option<Vec<NaiveDate>> {
    let first = aligned.first()?.1.dates()?.to_vec();
    if first.len() != periods {
        return None;
    }
    for (_, series) in aligned.iter().skip(1) {
        match series.dates() {
            Some(d) if d == first.as_slice() => {}
            _ => return None,
        }
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FundWeight, ReturnFrequency};
    use pretty_assertions::assert_eq;
    use rust_decimal::MathematicalOps;
    use rust_decimal_macros::dec;

    fn fund(code: &str, returns: Vec<Decimal>) -> FundReturns {
        FundReturns {
            fund_code: code.into(),
            returns: ReturnSeries::new(returns).unwrap(),
        }
    }

    fn weights(entries: Vec<(&str, Decimal)>) -> PortfolioWeights {
        PortfolioWeights::new(
            entries
                .into_iter()
                .map(|(code, weight)| FundWeight {
                    fund_code: code.into(),
                    weight,
                })
                .collect(),
        )
        .unwrap()
    }

    fn daily() -> AnalysisConfig {
        AnalysisConfig {
            frequency: ReturnFrequency::Daily,
            risk_free_rate: Decimal::ZERO,
        }
    }

    #[test]
    fn test_nav_starts_at_one_and_total_return_matches() {
        let input = BacktestInput {
            weights: weights(vec![("A", dec!(0.6)), ("B", dec!(0.4))]),
            funds: vec![
                fund("A", vec![dec!(0.01), dec!(0.02), dec!(-0.01)]),
                fund("B", vec![dec!(0.005), dec!(-0.002), dec!(0.001)]),
            ],
            config: daily(),
        };
        let out = run_backtest(&input).unwrap();
        let result = &out.result;

        assert_eq!(result.nav_path[0].nav, Decimal::ONE);
        assert_eq!(result.nav_path.len(), 4);
        let last = result.nav_path.last().unwrap().nav;
        assert_eq!(result.metrics.total_return, last - Decimal::ONE);
    }

    #[test]
    fn test_weighted_sum_of_returns() {
        let input = BacktestInput {
            weights: weights(vec![("A", dec!(0.5)), ("B", dec!(0.5))]),
            funds: vec![
                fund("A", vec![dec!(0.02), dec!(0.02)]),
                fund("B", vec![dec!(0.04), dec!(0.04)]),
            ],
            config: daily(),
        };
        let out = run_backtest(&input).unwrap();
        // Period return 0.03 each period
        let nav1 = out.result.nav_path[1].nav;
        assert!((nav1 - dec!(1.03)).abs() < dec!(0.0000001));
        let nav2 = out.result.nav_path[2].nav;
        assert!((nav2 - dec!(1.0609)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_missing_series_named() {
        let input = BacktestInput {
            weights: weights(vec![("A", dec!(0.5)), ("GONE", dec!(0.5))]),
            funds: vec![fund("A", vec![dec!(0.01), dec!(0.02)])],
            config: daily(),
        };
        let err = run_backtest(&input).unwrap_err();
        match err {
            FundAnalysisError::BacktestInput(msg) => assert!(msg.contains("GONE")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_zero_weight_fund_needs_no_series() {
        let input = BacktestInput {
            weights: weights(vec![("A", Decimal::ONE), ("IGNORED", Decimal::ZERO)]),
            funds: vec![fund("A", vec![dec!(0.01), dec!(0.02)])],
            config: daily(),
        };
        assert!(run_backtest(&input).is_ok());
    }

    #[test]
    fn test_truncates_to_shortest_window() {
        let input = BacktestInput {
            weights: weights(vec![("A", dec!(0.5)), ("B", dec!(0.5))]),
            funds: vec![
                fund("A", vec![dec!(0.01); 10]),
                fund("B", vec![dec!(0.01); 4]),
            ],
            config: daily(),
        };
        let out = run_backtest(&input).unwrap();
        assert_eq!(out.result.periods, 4);
        assert!(out.warnings.iter().any(|w| w.contains("truncated")));
    }

    #[test]
    fn test_metrics_match_single_fund_definitions() {
        // A one-fund portfolio must reproduce the fund's own factor metrics.
        let returns = vec![dec!(0.01), dec!(0.02), dec!(-0.01), dec!(0.015)];
        let input = BacktestInput {
            weights: weights(vec![("A", Decimal::ONE)]),
            funds: vec![fund("A", returns.clone())],
            config: daily(),
        };
        let out = run_backtest(&input).unwrap();
        let metrics = &out.result.metrics;

        let ppy = dec!(252);
        assert_eq!(
            metrics.volatility,
            crate::stats::annualized_volatility(&returns, ppy)
        );
        assert_eq!(metrics.max_drawdown, crate::stats::max_drawdown(&returns));
        assert!((metrics.max_drawdown - dec!(-0.01)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_dates_carry_through_when_shared() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        ];
        let series_a =
            ReturnSeries::with_dates(vec![dec!(0.01), dec!(0.02)], dates.clone()).unwrap();
        let series_b =
            ReturnSeries::with_dates(vec![dec!(0.005), dec!(0.001)], dates.clone()).unwrap();
        let input = BacktestInput {
            weights: weights(vec![("A", dec!(0.5)), ("B", dec!(0.5))]),
            funds: vec![
                FundReturns { fund_code: "A".into(), returns: series_a },
                FundReturns { fund_code: "B".into(), returns: series_b },
            ],
            config: daily(),
        };
        let out = run_backtest(&input).unwrap();
        assert_eq!(out.result.nav_path[0].date, None);
        assert_eq!(out.result.nav_path[1].date, Some(dates[0]));
        assert_eq!(out.result.nav_path[2].date, Some(dates[1]));
    }

    #[test]
    fn test_annual_return_is_geometric() {
        // +10% over 126 daily periods annualises to (1.1)^2 - 1 = 21%.
        let per_period = dec!(1.1).powd(dec!(1) / dec!(126)) - Decimal::ONE;
        let input = BacktestInput {
            weights: weights(vec![("A", Decimal::ONE)]),
            funds: vec![fund("A", vec![per_period; 126])],
            config: daily(),
        };
        let out = run_backtest(&input).unwrap();
        let annual = out.result.metrics.annual_return;
        assert!((annual - dec!(0.21)).abs() < dec!(0.001), "annual {}", annual);
    }
}
