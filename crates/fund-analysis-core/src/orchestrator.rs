use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::backtest::{run_backtest, BacktestInput, NavPoint};
use crate::error::FundAnalysisError;
use crate::factors::{self, FactorSet};
use crate::optimizer::{optimize_weights, OptimizeInput};
use crate::risk::assessment::assess_risk;
use crate::risk::exposure::{analyze_exposure, ExposureInput, FundStyleTag};
use crate::risk::stress::{run_stress_test, StressInput};
use crate::risk::RiskReport;
use crate::scoring::{self, FactorWeights, FundStyle};
use crate::types::{
    with_metadata, AnalysisConfig, ComputationOutput, FundReturns, PortfolioWeights, Rate,
    ReturnFrequency, ReturnSeries,
};
use crate::FundAnalysisResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Caller preferences for a full analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPreferences {
    /// Risk appetite in [0, 1]; 0 is most conservative.
    pub risk_tolerance: Decimal,
    /// Number of funds selected in auto mode.
    pub top_n: usize,
    pub risk_free_rate: Rate,
    pub frequency: ReturnFrequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_weights: Option<FactorWeights>,
}

impl Default for AnalysisPreferences {
    fn default() -> Self {
        AnalysisPreferences {
            risk_tolerance: dec!(0.5),
            top_n: 5,
            risk_free_rate: Decimal::ZERO,
            frequency: ReturnFrequency::Daily,
            factor_weights: None,
        }
    }
}

impl AnalysisPreferences {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            frequency: self.frequency,
            risk_free_rate: self.risk_free_rate,
        }
    }
}

/// An analysis request, resolved once at the entry point into a concrete fund
/// selection before any pool-level computation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AnalysisRequest {
    /// Score every pool fund and select the top `preferences.top_n` by
    /// composite score.
    Auto {
        pool: Vec<FundReturns>,
        #[serde(default)]
        preferences: AnalysisPreferences,
    },
    /// Use exactly the named funds from the pool.
    Manual {
        pool: Vec<FundReturns>,
        fund_codes: Vec<String>,
        #[serde(default)]
        preferences: AnalysisPreferences,
    },
}

/// Input for scoring one fund in isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundAnalysisInput {
    pub fund_code: String,
    pub returns: ReturnSeries,
    #[serde(default)]
    pub config: AnalysisConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_weights: Option<FactorWeights>,
}

/// One fund's factors, composite score and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundAnalysis {
    pub fund_code: String,
    pub factors: FactorSet,
    pub composite_score: Decimal,
    pub style: FundStyle,
}

/// The combined report for one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Fund codes the portfolio was built from, ascending.
    pub selected_funds: Vec<String>,
    /// Every pool fund's analysis, best composite score first.
    pub fund_scores: Vec<FundAnalysis>,
    pub weights: PortfolioWeights,
    pub nav_path: Vec<NavPoint>,
    pub risk_report: RiskReport,
}

/// Input to the standalone portfolio risk report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReportInput {
    pub weights: PortfolioWeights,
    pub funds: Vec<FundReturns>,
    #[serde(default)]
    pub config: AnalysisConfig,
}

/// Sort key for fund ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingKey {
    #[default]
    CompositeScore,
    SharpeRatio,
    Return1Y,
    /// Shallowest maximum drawdown first.
    DrawdownControl,
}

/// Input to fund ranking over a reference universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingInput {
    pub funds: Vec<FundReturns>,
    #[serde(default)]
    pub key: RankingKey,
    #[serde(default)]
    pub config: AnalysisConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_weights: Option<FactorWeights>,
}

/// One row of a fund ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRanking {
    pub rank: usize,
    pub fund_code: String,
    pub composite_score: Decimal,
    pub return_1y: Rate,
    pub sharpe_ratio: Decimal,
    pub max_drawdown: Rate,
    pub style: FundStyle,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a single fund: factors, composite score and style label.
pub fn analyze_fund(input: &FundAnalysisInput) -> FundAnalysisResult<ComputationOutput<FundAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let factor_weights = normalized_weights(&input.factor_weights)?;
    let analysis = fund_profile(
        &input.fund_code,
        &input.returns,
        &input.config,
        &factor_weights,
        &mut warnings,
    )?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Single-Fund Factor Scoring",
        &serde_json::json!({
            "fund_code": input.fund_code,
            "observations": input.returns.len(),
            "frequency": format!("{:?}", input.config.frequency),
        }),
        warnings,
        elapsed,
        analysis,
    ))
}

/// Run the full pipeline for one request: per-fund scoring, fund selection,
/// weight optimization, backtest and risk report.
pub fn analyze(request: &AnalysisRequest) -> FundAnalysisResult<ComputationOutput<AnalysisReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (pool, preferences) = match request {
        AnalysisRequest::Auto { pool, preferences } => (pool, preferences),
        AnalysisRequest::Manual { pool, preferences, .. } => (pool, preferences),
    };
    validate_pool(pool)?;
    let config = preferences.config();
    let factor_weights = normalized_weights(&preferences.factor_weights)?;

    // Per-fund analysis over the whole pool, best score first.
    let mut fund_scores = score_pool(pool, &config, &factor_weights, &mut warnings)?;
    fund_scores.sort_by(|a, b| {
        b.composite_score
            .cmp(&a.composite_score)
            .then_with(|| a.fund_code.cmp(&b.fund_code))
    });

    // Resolve the request into a concrete selection.
    let mut selected: Vec<String> = match request {
        AnalysisRequest::Auto { .. } => {
            if preferences.top_n == 0 {
                return Err(FundAnalysisError::InvalidInput {
                    field: "preferences.top_n".into(),
                    reason: "must select at least one fund".into(),
                });
            }
            fund_scores
                .iter()
                .take(preferences.top_n)
                .map(|a| a.fund_code.clone())
                .collect()
        }
        AnalysisRequest::Manual { fund_codes, .. } => {
            resolve_manual_selection(pool, fund_codes)?
        }
    };
    selected.sort_unstable();

    let selection: Vec<FundReturns> = pool
        .iter()
        .filter(|f| selected.binary_search(&f.fund_code).is_ok())
        .cloned()
        .collect();

    // Optimize, simulate, assess.
    let optimized = optimize_weights(&OptimizeInput {
        funds: selection.clone(),
        risk_tolerance: preferences.risk_tolerance,
        config,
    })?;
    warnings.extend(optimized.warnings);
    let weights = optimized.result.weights.clone();

    let backtested = run_backtest(&BacktestInput {
        weights: weights.clone(),
        funds: selection.clone(),
        config,
    })?;
    warnings.extend(backtested.warnings);

    let assessment = assess_risk(&backtested.result.metrics)?;
    let stress = run_stress_test(&StressInput {
        weights: weights.clone(),
        funds: selection.clone(),
        config,
    })?;
    let styles: Vec<FundStyleTag> = fund_scores
        .iter()
        .filter(|a| selected.binary_search(&a.fund_code).is_ok())
        .map(|a| FundStyleTag {
            fund_code: a.fund_code.clone(),
            style: a.style,
        })
        .collect();
    let exposure = analyze_exposure(&ExposureInput {
        weights: weights.clone(),
        styles,
    })?;

    let report = AnalysisReport {
        selected_funds: selected,
        fund_scores,
        weights,
        nav_path: backtested.result.nav_path,
        risk_report: RiskReport {
            risk_metrics: backtested.result.metrics,
            risk_assessment: assessment.result,
            stress_test: stress.result,
            exposure: exposure.result,
        },
    };

    let mode = match request {
        AnalysisRequest::Auto { .. } => "auto",
        AnalysisRequest::Manual { .. } => "manual",
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "End-to-End Fund Analysis Pipeline",
        &serde_json::json!({
            "mode": mode,
            "pool_size": pool.len(),
            "selected": report.selected_funds.len(),
            "risk_tolerance": preferences.risk_tolerance.to_string(),
        }),
        warnings,
        elapsed,
        report,
    ))
}

/// Build the standalone risk report for an existing allocation.
pub fn assess_portfolio_risk(
    input: &RiskReportInput,
) -> FundAnalysisResult<ComputationOutput<RiskReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let backtested = run_backtest(&BacktestInput {
        weights: input.weights.clone(),
        funds: input.funds.clone(),
        config: input.config,
    })?;
    warnings.extend(backtested.warnings);

    let assessment = assess_risk(&backtested.result.metrics)?;
    let stress = run_stress_test(&StressInput {
        weights: input.weights.clone(),
        funds: input.funds.clone(),
        config: input.config,
    })?;

    // Styles for the weighted funds, derived from their own histories.
    let factor_weights = FactorWeights::default();
    let mut styles: Vec<FundStyleTag> = Vec::new();
    for fund in &input.funds {
        match input.weights.get(&fund.fund_code) {
            Some(w) if !w.is_zero() => {
                let profile = fund_profile(
                    &fund.fund_code,
                    &fund.returns,
                    &input.config,
                    &factor_weights,
                    &mut warnings,
                )?;
                styles.push(FundStyleTag {
                    fund_code: fund.fund_code.clone(),
                    style: profile.style,
                });
            }
            _ => {}
        }
    }
    let exposure = analyze_exposure(&ExposureInput {
        weights: input.weights.clone(),
        styles,
    })?;

    let report = RiskReport {
        risk_metrics: backtested.result.metrics,
        risk_assessment: assessment.result,
        stress_test: stress.result,
        exposure: exposure.result,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio Risk Report",
        &serde_json::json!({
            "n_weights": input.weights.len(),
            "frequency": format!("{:?}", input.config.frequency),
        }),
        warnings,
        elapsed,
        report,
    ))
}

/// Rank every fund in a reference universe by the chosen key. Orders are
/// total and deterministic: descending by key, ties broken by fund code
/// ascending.
pub fn rank_funds(input: &RankingInput) -> FundAnalysisResult<ComputationOutput<Vec<FundRanking>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_pool(&input.funds)?;
    let factor_weights = normalized_weights(&input.factor_weights)?;

    let mut profiles = score_pool(&input.funds, &input.config, &factor_weights, &mut warnings)?;
    profiles.sort_by(|a, b| {
        ranking_value(b, input.key)
            .cmp(&ranking_value(a, input.key))
            .then_with(|| a.fund_code.cmp(&b.fund_code))
    });

    let ranking: Vec<FundRanking> = profiles
        .into_iter()
        .enumerate()
        .map(|(i, a)| FundRanking {
            rank: i + 1,
            fund_code: a.fund_code,
            composite_score: a.composite_score,
            return_1y: a.factors.return_1y,
            sharpe_ratio: a.factors.sharpe_ratio,
            max_drawdown: a.factors.max_drawdown,
            style: a.style,
        })
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Universe Ranking",
        &serde_json::json!({
            "n_funds": ranking.len(),
            "key": input.key,
        }),
        warnings,
        elapsed,
        ranking,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn ranking_value(analysis: &FundAnalysis, key: RankingKey) -> Decimal {
    match key {
        RankingKey::CompositeScore => analysis.composite_score,
        RankingKey::SharpeRatio => analysis.factors.sharpe_ratio,
        RankingKey::Return1Y => analysis.factors.return_1y,
        RankingKey::DrawdownControl => analysis.factors.max_drawdown,
    }
}

fn normalized_weights(weights: &Option<FactorWeights>) -> FundAnalysisResult<FactorWeights> {
    match weights {
        Some(w) => w.normalized(),
        None => Ok(FactorWeights::default()),
    }
}

fn fund_profile(
    fund_code: &str,
    returns: &ReturnSeries,
    config: &AnalysisConfig,
    factor_weights: &FactorWeights,
    warnings: &mut Vec<String>,
) -> FundAnalysisResult<FundAnalysis> {
    let mut fund_warnings: Vec<String> = Vec::new();
    let factors = factors::factor_set(returns, config, &mut fund_warnings).map_err(|e| {
        match e {
            FundAnalysisError::InsufficientData(msg) => {
                FundAnalysisError::InsufficientData(format!("{}: {}", fund_code, msg))
            }
            other => other,
        }
    })?;
    warnings.extend(fund_warnings.into_iter().map(|w| format!("{}: {}", fund_code, w)));

    Ok(FundAnalysis {
        fund_code: fund_code.to_string(),
        composite_score: scoring::composite_score(&factors, factor_weights),
        style: scoring::classify_style(&factors),
        factors,
    })
}

fn score_pool(
    pool: &[FundReturns],
    config: &AnalysisConfig,
    factor_weights: &FactorWeights,
    warnings: &mut Vec<String>,
) -> FundAnalysisResult<Vec<FundAnalysis>> {
    pool.iter()
        .map(|fund| fund_profile(&fund.fund_code, &fund.returns, config, factor_weights, warnings))
        .collect()
}

fn validate_pool(pool: &[FundReturns]) -> FundAnalysisResult<()> {
    if pool.is_empty() {
        return Err(FundAnalysisError::InsufficientData(
            "fund pool is empty".into(),
        ));
    }
    let mut codes: Vec<&str> = pool.iter().map(|f| f.fund_code.as_str()).collect();
    codes.sort_unstable();
    for pair in codes.windows(2) {
        if pair[0] == pair[1] {
            return Err(FundAnalysisError::InvalidInput {
                field: "pool".into(),
                reason: format!("duplicate fund code {}", pair[0]),
            });
        }
    }
    Ok(())
}

fn resolve_manual_selection(
    pool: &[FundReturns],
    fund_codes: &[String],
) -> FundAnalysisResult<Vec<String>> {
    if fund_codes.is_empty() {
        return Err(FundAnalysisError::InvalidInput {
            field: "fund_codes".into(),
            reason: "manual mode requires at least one fund code".into(),
        });
    }

    let mut sorted = fund_codes.to_vec();
    sorted.sort_unstable();
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            return Err(FundAnalysisError::InvalidInput {
                field: "fund_codes".into(),
                reason: format!("duplicate fund code {}", pair[0]),
            });
        }
    }

    let missing: Vec<String> = sorted
        .iter()
        .filter(|code| !pool.iter().any(|f| &f.fund_code == *code))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(FundAnalysisError::InvalidInput {
            field: "fund_codes".into(),
            reason: format!("not present in the pool: {}", missing.join(", ")),
        });
    }

    Ok(sorted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
