use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::backtest::{run_backtest, BacktestInput};
use crate::types::{
    with_metadata, AnalysisConfig, ComputationOutput, FundReturns, PortfolioWeights, Rate,
    ReturnSeries,
};
use crate::FundAnalysisResult;

/// Total shock applied by the market-crash scenario.
pub const MARKET_CRASH_SHOCK: Decimal = dec!(-0.30);
/// Total shock applied by the liquidity-crisis scenario.
pub const LIQUIDITY_CRISIS_SHOCK: Decimal = dec!(-0.15);
/// Deviation multiplier applied by the volatility-spike scenario.
pub const VOLATILITY_SPIKE_FACTOR: Decimal = dec!(2);

/// Stressed period returns never fall below this floor.
const STRESSED_RETURN_FLOOR: Decimal = dec!(-0.95);

/// Input to deterministic portfolio stress testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressInput {
    pub weights: PortfolioWeights,
    pub funds: Vec<FundReturns>,
    #[serde(default)]
    pub config: AnalysisConfig,
}

/// Portfolio metrics under one stressed scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressResult {
    pub scenario: String,
    pub description: String,
    pub annual_return: Rate,
    pub volatility: Rate,
    pub max_drawdown: Rate,
}

enum Scenario {
    UniformShock { name: &'static str, description: &'static str, total_shock: Decimal },
    VolatilitySpike { name: &'static str, description: &'static str, factor: Decimal },
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::UniformShock {
            name: "market_crash",
            description: "uniform -30% market shock spread across the window",
            total_shock: MARKET_CRASH_SHOCK,
        },
        Scenario::UniformShock {
            name: "liquidity_crisis",
            description: "uniform -15% shock spread across the window",
            total_shock: LIQUIDITY_CRISIS_SHOCK,
        },
        Scenario::VolatilitySpike {
            name: "volatility_spike",
            description: "return deviations doubled around the mean",
            factor: VOLATILITY_SPIKE_FACTOR,
        },
    ]
}

/// Re-simulate the portfolio under each fixed stress scenario, in declaration
/// order. Fully deterministic for identical inputs.
pub fn run_stress_test(input: &StressInput) -> FundAnalysisResult<ComputationOutput<Vec<StressResult>>> {
    let start = Instant::now();

    let mut results = Vec::new();
    for scenario in scenarios() {
        let (name, description, stressed_funds) = match scenario {
            Scenario::UniformShock { name, description, total_shock } => {
                let funds = input
                    .funds
                    .iter()
                    .map(|f| shocked_fund(f, total_shock))
                    .collect::<FundAnalysisResult<Vec<_>>>()?;
                (name, description, funds)
            }
            Scenario::VolatilitySpike { name, description, factor } => {
                let funds = input
                    .funds
                    .iter()
                    .map(|f| spiked_fund(f, factor))
                    .collect::<FundAnalysisResult<Vec<_>>>()?;
                (name, description, funds)
            }
        };

        let backtest = run_backtest(&BacktestInput {
            weights: input.weights.clone(),
            funds: stressed_funds,
            config: input.config,
        })?;

        results.push(StressResult {
            scenario: name.to_string(),
            description: description.to_string(),
            annual_return: backtest.result.metrics.annual_return,
            volatility: backtest.result.metrics.volatility,
            max_drawdown: backtest.result.metrics.max_drawdown,
        });
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Deterministic Scenario Stress Testing",
        &serde_json::json!({
            "scenarios": results.iter().map(|r| r.scenario.clone()).collect::<Vec<_>>(),
            "market_crash_shock": MARKET_CRASH_SHOCK.to_string(),
            "liquidity_crisis_shock": LIQUIDITY_CRISIS_SHOCK.to_string(),
            "volatility_spike_factor": VOLATILITY_SPIKE_FACTOR.to_string(),
        }),
        Vec::new(),
        elapsed,
        results,
    ))
}

/// Spread `total_shock` evenly across the fund's periods.
fn shocked_fund(fund: &FundReturns, total_shock: Decimal) -> FundAnalysisResult<FundReturns> {
    let n = fund.returns.len();
    let per_period = total_shock / Decimal::from(n as i64);
    let stressed: Vec<Decimal> = fund
        .returns
        .returns()
        .iter()
        .map(|r| (*r + per_period).max(STRESSED_RETURN_FLOOR))
        .collect();
    Ok(FundReturns {
        fund_code: fund.fund_code.clone(),
        returns: ReturnSeries::new(stressed)?,
    })
}

/// Scale deviations around the fund's mean return, preserving the mean.
fn spiked_fund(fund: &FundReturns, factor: Decimal) -> FundAnalysisResult<FundReturns> {
    let returns = fund.returns.returns();
    let mean = crate::stats::mean(returns);
    let stressed: Vec<Decimal> = returns
        .iter()
        .map(|r| (mean + factor * (*r - mean)).max(STRESSED_RETURN_FLOOR))
        .collect();
    Ok(FundReturns {
        fund_code: fund.fund_code.clone(),
        returns: ReturnSeries::new(stressed)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FundWeight;
    use pretty_assertions::assert_eq;

    fn input() -> StressInput {
        StressInput {
            weights: PortfolioWeights::new(vec![
                FundWeight { fund_code: "A".into(), weight: dec!(0.5) },
                FundWeight { fund_code: "B".into(), weight: dec!(0.5) },
            ])
            .unwrap(),
            funds: vec![
                FundReturns {
                    fund_code: "A".into(),
                    returns: ReturnSeries::new(vec![dec!(0.01), dec!(-0.02), dec!(0.015), dec!(0.005)])
                        .unwrap(),
                },
                FundReturns {
                    fund_code: "B".into(),
                    returns: ReturnSeries::new(vec![dec!(0.002), dec!(0.001), dec!(-0.001), dec!(0.003)])
                        .unwrap(),
                },
            ],
            config: AnalysisConfig::default(),
        }
    }

    #[test]
    fn test_scenarios_in_fixed_order() {
        let out = run_stress_test(&input()).unwrap();
        let names: Vec<&str> = out.result.iter().map(|r| r.scenario.as_str()).collect();
        assert_eq!(names, vec!["market_crash", "liquidity_crisis", "volatility_spike"]);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let a = run_stress_test(&input()).unwrap();
        let b = run_stress_test(&input()).unwrap();
        assert_eq!(a.result, b.result);
    }

    #[test]
    fn test_crash_worsens_drawdown() {
        let baseline = run_backtest(&BacktestInput {
            weights: input().weights,
            funds: input().funds,
            config: AnalysisConfig::default(),
        })
        .unwrap();
        let stressed = run_stress_test(&input()).unwrap();
        let crash = &stressed.result[0];
        assert!(crash.max_drawdown < baseline.result.metrics.max_drawdown);
    }

    #[test]
    fn test_spike_raises_volatility() {
        let baseline = run_backtest(&BacktestInput {
            weights: input().weights,
            funds: input().funds,
            config: AnalysisConfig::default(),
        })
        .unwrap();
        let stressed = run_stress_test(&input()).unwrap();
        let spike = &stressed.result[2];
        assert!(spike.volatility > baseline.result.metrics.volatility);
    }

    #[test]
    fn test_shock_floor_respected() {
        let fund = FundReturns {
            fund_code: "X".into(),
            returns: ReturnSeries::new(vec![dec!(-0.90)]).unwrap(),
        };
        let shocked = shocked_fund(&fund, MARKET_CRASH_SHOCK).unwrap();
        assert_eq!(shocked.returns.returns()[0], STRESSED_RETURN_FLOOR);
    }
}
