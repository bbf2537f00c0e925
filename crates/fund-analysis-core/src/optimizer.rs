use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FundAnalysisError;
use crate::stats;
use crate::types::{
    with_metadata, AnalysisConfig, ComputationOutput, FundReturns, FundWeight, PortfolioWeights,
    Rate,
};
use crate::FundAnalysisResult;

// ---------------------------------------------------------------------------
// Tuning constants
// ---------------------------------------------------------------------------

/// Risk aversion at full risk tolerance (aggressive).
pub const MIN_RISK_AVERSION: Decimal = dec!(0.1);
/// Risk aversion at zero risk tolerance (conservative).
pub const MAX_RISK_AVERSION: Decimal = dec!(10);

/// Weights may undershoot zero by this much before a candidate is rejected.
const FEASIBILITY_TOLERANCE: Decimal = dec!(0.0001);
/// Gauss-Jordan pivot threshold below which the matrix counts as singular.
const PIVOT_EPSILON: Decimal = dec!(0.0000000001);
/// Ridge added to the covariance diagonal relative to its mean variance.
const RIDGE_FACTOR: Decimal = dec!(0.000001);
const RIDGE_MINIMUM: Decimal = dec!(0.0000000001);
/// Final weights must sum to 1 within this bound.
const WEIGHT_SUM_EPSILON: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input to portfolio weight optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeInput {
    /// Candidate funds with their return histories.
    pub funds: Vec<FundReturns>,
    /// Caller's risk appetite in [0, 1]; 0 is most conservative.
    pub risk_tolerance: Decimal,
    #[serde(default)]
    pub config: AnalysisConfig,
}

/// Output of portfolio weight optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeOutput {
    pub weights: PortfolioWeights,
    /// Annualised expected portfolio return at the optimal weights.
    pub expected_return: Rate,
    /// Annualised portfolio standard deviation.
    pub expected_volatility: Rate,
    pub sharpe_ratio: Decimal,
    /// Risk aversion derived from the requested risk tolerance.
    pub risk_aversion: Decimal,
    /// Number of aligned periods the estimates were computed from.
    pub aligned_periods: usize,
    /// True when the allocation fell back to equal weights.
    pub fallback: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute long-only portfolio weights maximising
/// `expected_return - risk_aversion * variance` subject to weights >= 0 and
/// summing to 1.
///
/// Series of unequal length are truncated to the shortest common trailing
/// window. A singular covariance matrix is ridge-regularised; a degenerate
/// allocation falls back to equal weights with the result flagged.
pub fn optimize_weights(input: &OptimizeInput) -> FundAnalysisResult<ComputationOutput<OptimizeOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut funds: Vec<&FundReturns> = input.funds.iter().collect();
    funds.sort_by(|a, b| a.fund_code.cmp(&b.fund_code));
    validate_input(&funds, input.risk_tolerance)?;

    let n = funds.len();
    let risk_aversion =
        MIN_RISK_AVERSION + (Decimal::ONE - input.risk_tolerance) * (MAX_RISK_AVERSION - MIN_RISK_AVERSION);

    // --- Single-fund pool ---
    if n == 1 {
        let only = funds[0];
        let periods_per_year = input.config.frequency.periods_per_year();
        let returns = only.returns.returns();
        let expected_return = stats::annualized_mean_return(returns, periods_per_year);
        let expected_volatility = stats::annualized_volatility(returns, periods_per_year);
        let output = OptimizeOutput {
            weights: PortfolioWeights::new(vec![FundWeight {
                fund_code: only.fund_code.clone(),
                weight: Decimal::ONE,
            }])?,
            expected_return,
            expected_volatility,
            sharpe_ratio: stats::sharpe_ratio(
                expected_return,
                input.config.risk_free_rate,
                expected_volatility,
            ),
            risk_aversion,
            aligned_periods: returns.len(),
            fallback: false,
        };
        let elapsed = start.elapsed().as_micros() as u64;
        return Ok(envelope(input, n, 0, warnings, elapsed, output));
    }

    // --- Alignment to the shortest common trailing window ---
    let aligned_periods = funds.iter().map(|f| f.returns.len()).min().unwrap_or(0);
    if aligned_periods < 2 {
        return Err(FundAnalysisError::InsufficientOverlap(format!(
            "shortest common window has {} period(s); at least 2 required",
            aligned_periods
        )));
    }
    if funds.iter().any(|f| f.returns.len() > aligned_periods) {
        warnings.push(format!(
            "series truncated to the shortest common trailing window of {} periods",
            aligned_periods
        ));
    }
    let aligned: Vec<Vec<Decimal>> = funds
        .iter()
        .map(|f| f.returns.trailing(aligned_periods).returns().to_vec())
        .collect();

    // --- Annualised return and covariance estimates ---
    let periods_per_year = input.config.frequency.periods_per_year();
    let means: Vec<Decimal> = aligned.iter().map(|r| stats::mean(r)).collect();
    let mu: Vec<Decimal> = means.iter().map(|m| *m * periods_per_year).collect();

    let mut sigma = vec![vec![Decimal::ZERO; n]; n];
    for i in 0..n {
        for j in i..n {
            let cov = stats::covariance(&aligned[i], &aligned[j], means[i], means[j]) * periods_per_year;
            sigma[i][j] = cov;
            sigma[j][i] = cov;
        }
    }

    if mat_inverse(&sigma).is_none() {
        let mean_variance: Decimal =
            (0..n).map(|i| sigma[i][i]).sum::<Decimal>() / Decimal::from(n as i64);
        let ridge = (RIDGE_FACTOR * mean_variance).max(RIDGE_MINIMUM);
        for (i, row) in sigma.iter_mut().enumerate() {
            row[i] += ridge;
        }
        warnings.push(format!(
            "covariance matrix near-singular; diagonal ridge-regularised by {}",
            ridge
        ));
    }

    // --- Allocation ---
    let (mut w, fallback) = match solve_long_only(&sigma, &mu, risk_aversion) {
        Ok(w) => (w, false),
        Err(e) => {
            warnings.push(format!("{}; falling back to equal weights", e));
            (equal_weights(n), true)
        }
    };

    clamp_non_negative(&mut w);
    normalize_weights(&mut w);
    debug_assert!((w.iter().sum::<Decimal>() - Decimal::ONE).abs() <= WEIGHT_SUM_EPSILON);

    let expected_return = vec_dot(&w, &mu);
    let sigma_w = mat_vec_multiply(&sigma, &w);
    let expected_volatility = stats::sqrt_decimal(vec_dot(&w, &sigma_w));

    let entries: Vec<FundWeight> = funds
        .iter()
        .zip(w.iter())
        .map(|(f, weight)| FundWeight {
            fund_code: f.fund_code.clone(),
            weight: *weight,
        })
        .collect();

    let output = OptimizeOutput {
        weights: PortfolioWeights::new(entries)?,
        expected_return,
        expected_volatility,
        sharpe_ratio: stats::sharpe_ratio(
            expected_return,
            input.config.risk_free_rate,
            expected_volatility,
        ),
        risk_aversion,
        aligned_periods,
        fallback,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(envelope(input, n, aligned_periods, warnings, elapsed, output))
}

fn envelope(
    input: &OptimizeInput,
    n: usize,
    aligned_periods: usize,
    warnings: Vec<String>,
    elapsed: u64,
    output: OptimizeOutput,
) -> ComputationOutput<OptimizeOutput> {
    with_metadata(
        "Long-Only Mean-Variance Allocation",
        &serde_json::json!({
            "n_funds": n,
            "risk_tolerance": input.risk_tolerance.to_string(),
            "aligned_periods": aligned_periods,
            "frequency": format!("{:?}", input.config.frequency),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Core allocation routine
// ---------------------------------------------------------------------------

/// Long-only allocation by active-set elimination.
///
/// Each pass solves the equality-constrained problem on the active funds via
/// the stationary conditions (w = Sigma^-1 (mu - eta*1) / (2*lambda) with eta
/// chosen so the weights sum to 1). An infeasible candidate drops its most
/// negative weight from the active set; the loop is bounded by the pool size.
fn solve_long_only(
    sigma: &[Vec<Decimal>],
    mu: &[Decimal],
    risk_aversion: Decimal,
) -> FundAnalysisResult<Vec<Decimal>> {
    let n = mu.len();
    let mut active: Vec<usize> = (0..n).collect();

    for _ in 0..n {
        if active.len() == 1 {
            let mut w = vec![Decimal::ZERO; n];
            w[active[0]] = Decimal::ONE;
            return Ok(w);
        }

        let sub_sigma: Vec<Vec<Decimal>> = active
            .iter()
            .map(|&i| active.iter().map(|&j| sigma[i][j]).collect())
            .collect();
        let sub_mu: Vec<Decimal> = active.iter().map(|&i| mu[i]).collect();

        let sub_w = solve_equality_constrained(&sub_sigma, &sub_mu, risk_aversion)?;

        if sub_w.iter().all(|wi| *wi >= -FEASIBILITY_TOLERANCE) {
            let mut w = vec![Decimal::ZERO; n];
            for (slot, weight) in active.iter().zip(sub_w.iter()) {
                w[*slot] = *weight;
            }
            return Ok(w);
        }

        // Drop the most negative weight; earliest index wins a tie.
        let mut drop_pos = 0;
        let mut drop_weight = sub_w[0];
        for (pos, wi) in sub_w.iter().enumerate().skip(1) {
            if *wi < drop_weight {
                drop_weight = *wi;
                drop_pos = pos;
            }
        }
        active.remove(drop_pos);
    }

    Err(FundAnalysisError::Optimization(format!(
        "no feasible long-only allocation after {} active-set passes",
        n
    )))
}

/// Stationary solution of max mu'w - lambda * w'Sigma w subject to sum(w) = 1.
fn solve_equality_constrained(
    sigma: &[Vec<Decimal>],
    mu: &[Decimal],
    risk_aversion: Decimal,
) -> FundAnalysisResult<Vec<Decimal>> {
    let n = mu.len();
    let two_lambda = dec!(2) * risk_aversion;

    let inverse = mat_inverse(sigma).ok_or_else(|| {
        FundAnalysisError::Optimization("covariance submatrix is singular".into())
    })?;

    let ones = vec![Decimal::ONE; n];
    let inv_ones = mat_vec_multiply(&inverse, &ones);
    let inv_mu = mat_vec_multiply(&inverse, mu);

    let denom: Decimal = inv_ones.iter().sum();
    if denom.abs() < PIVOT_EPSILON {
        return Err(FundAnalysisError::Optimization(
            "degenerate budget constraint: 1' Sigma^-1 1 is zero".into(),
        ));
    }

    let eta = (inv_mu.iter().sum::<Decimal>() - two_lambda) / denom;
    Ok((0..n)
        .map(|i| (inv_mu[i] - eta * inv_ones[i]) / two_lambda)
        .collect())
}

// ---------------------------------------------------------------------------
// Weight helpers
// ---------------------------------------------------------------------------

fn clamp_non_negative(w: &mut [Decimal]) {
    for wi in w.iter_mut() {
        if *wi < Decimal::ZERO {
            *wi = Decimal::ZERO;
        }
    }
}

/// Normalize weights to sum to 1.
fn normalize_weights(w: &mut [Decimal]) {
    let total: Decimal = w.iter().sum();
    if !total.is_zero() {
        for wi in w.iter_mut() {
            *wi /= total;
        }
    }
}

/// Equal weights for n funds.
fn equal_weights(n: usize) -> Vec<Decimal> {
    let w = Decimal::ONE / Decimal::from(n as i64);
    vec![w; n]
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(funds: &[&FundReturns], risk_tolerance: Decimal) -> FundAnalysisResult<()> {
    if funds.is_empty() {
        return Err(FundAnalysisError::InsufficientData(
            "at least one fund required in the pool".into(),
        ));
    }

    for pair in funds.windows(2) {
        if pair[0].fund_code == pair[1].fund_code {
            return Err(FundAnalysisError::InvalidInput {
                field: "funds".into(),
                reason: format!("duplicate fund code {}", pair[0].fund_code),
            });
        }
    }

    if risk_tolerance < Decimal::ZERO || risk_tolerance > Decimal::ONE {
        return Err(FundAnalysisError::InvalidInput {
            field: "risk_tolerance".into(),
            reason: format!("{} is outside [0, 1]", risk_tolerance),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Matrix helpers (private)
// ---------------------------------------------------------------------------

/// Matrix-vector multiplication.
fn mat_vec_multiply(mat: &[Vec<Decimal>], v: &[Decimal]) -> Vec<Decimal> {
    mat.iter().map(|row| vec_dot(row, v)).collect()
}

/// Dot product.
fn vec_dot(a: &[Decimal], b: &[Decimal]) -> Decimal {
    a.iter().zip(b.iter()).map(|(x, y)| *x * *y).sum()
}

/// Matrix inverse via Gauss-Jordan with partial pivoting. None when a pivot
/// falls below the singularity threshold.
#[allow(clippy::needless_range_loop)]
fn mat_inverse(mat: &[Vec<Decimal>]) -> Option<Vec<Vec<Decimal>>> {
    let n = mat.len();
    if n == 0 {
        return Some(Vec::new());
    }

    let mut aug: Vec<Vec<Decimal>> = Vec::with_capacity(n);
    for i in 0..n {
        let mut row = Vec::with_capacity(2 * n);
        row.extend_from_slice(&mat[i]);
        for j in 0..n {
            row.push(if i == j { Decimal::ONE } else { Decimal::ZERO });
        }
        aug.push(row);
    }

    for col in 0..n {
        let mut max_row = col;
        let mut max_val = aug[col][col].abs();
        for row in (col + 1)..n {
            let val = aug[row][col].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val < PIVOT_EPSILON {
            return None;
        }

        if max_row != col {
            aug.swap(col, max_row);
        }

        let pivot = aug[col][col];
        for cell in aug[col].iter_mut() {
            *cell /= pivot;
        }

        let pivot_row = aug[col].clone();
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            for (cell, &pv) in aug[row].iter_mut().zip(pivot_row.iter()) {
                *cell -= factor * pv;
            }
        }
    }

    Some(aug.iter().map(|row| row[n..].to_vec()).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReturnFrequency, ReturnSeries};

    fn fund(code: &str, returns: Vec<Decimal>) -> FundReturns {
        FundReturns {
            fund_code: code.into(),
            returns: ReturnSeries::new(returns).unwrap(),
        }
    }

    /// Deterministic series around `base` alternating +/- `amplitude` with
    /// period 2.
    fn wobble2(base: Decimal, amplitude: Decimal, periods: usize) -> Vec<Decimal> {
        (0..periods)
            .map(|i| if i % 2 == 0 { base + amplitude } else { base - amplitude })
            .collect()
    }

    /// Deterministic series around `base` cycling +amp, 0, -amp with period 3,
    /// orthogonal to the period-2 wobble over a multiple of 6 observations.
    fn wobble3(base: Decimal, amplitude: Decimal, periods: usize) -> Vec<Decimal> {
        (0..periods)
            .map(|i| match i % 3 {
                0 => base + amplitude,
                1 => base,
                _ => base - amplitude,
            })
            .collect()
    }

    fn two_fund_input(risk_tolerance: Decimal) -> OptimizeInput {
        OptimizeInput {
            // HIGH: strong mean, large swings. LOW: modest mean, small swings.
            funds: vec![
                fund("HIGH", wobble2(dec!(0.0010), dec!(0.02), 60)),
                fund("LOW", wobble3(dec!(0.0003), dec!(0.004), 60)),
            ],
            risk_tolerance,
            config: AnalysisConfig {
                frequency: ReturnFrequency::Daily,
                risk_free_rate: Decimal::ZERO,
            },
        }
    }

    // ------------------------------------------------------------------
    // 1. Weights sum to one and are non-negative
    // ------------------------------------------------------------------
    #[test]
    fn test_weights_sum_to_one() {
        let out = optimize_weights(&two_fund_input(dec!(0.5))).unwrap();
        let total = out.result.weights.sum();
        assert!((total - Decimal::ONE).abs() <= dec!(0.000001), "sum {}", total);
        for entry in out.result.weights.entries() {
            assert!(entry.weight >= Decimal::ZERO);
        }
    }

    // ------------------------------------------------------------------
    // 2. Single-fund pool takes the whole allocation
    // ------------------------------------------------------------------
    #[test]
    fn test_single_fund_full_weight() {
        let input = OptimizeInput {
            funds: vec![fund("ONLY", wobble2(dec!(0.0005), dec!(0.01), 30))],
            risk_tolerance: dec!(0.5),
            config: AnalysisConfig::default(),
        };
        let out = optimize_weights(&input).unwrap();
        assert_eq!(out.result.weights.get("ONLY"), Some(Decimal::ONE));
        assert!(!out.result.fallback);
    }

    // ------------------------------------------------------------------
    // 3. Conservative tolerance favours the low-volatility fund
    // ------------------------------------------------------------------
    #[test]
    fn test_conservative_favours_low_volatility() {
        let out = optimize_weights(&two_fund_input(Decimal::ZERO)).unwrap();
        let low = out.result.weights.get("LOW").unwrap();
        let high = out.result.weights.get("HIGH").unwrap();
        assert!(low > high, "LOW {} should exceed HIGH {}", low, high);
    }

    // ------------------------------------------------------------------
    // 4. Aggressive tolerance favours the high-return fund
    // ------------------------------------------------------------------
    #[test]
    fn test_aggressive_favours_high_return() {
        let out = optimize_weights(&two_fund_input(Decimal::ONE)).unwrap();
        let low = out.result.weights.get("LOW").unwrap();
        let high = out.result.weights.get("HIGH").unwrap();
        assert!(high > low, "HIGH {} should exceed LOW {}", high, low);
    }

    // ------------------------------------------------------------------
    // 5. Expected return is monotone in risk tolerance
    // ------------------------------------------------------------------
    #[test]
    fn test_expected_return_monotone_in_tolerance() {
        let conservative = optimize_weights(&two_fund_input(Decimal::ZERO)).unwrap();
        let moderate = optimize_weights(&two_fund_input(dec!(0.5))).unwrap();
        let aggressive = optimize_weights(&two_fund_input(Decimal::ONE)).unwrap();
        assert!(moderate.result.expected_return >= conservative.result.expected_return);
        assert!(aggressive.result.expected_return >= moderate.result.expected_return);
    }

    // ------------------------------------------------------------------
    // 6. Unequal series lengths truncate with a warning
    // ------------------------------------------------------------------
    #[test]
    fn test_truncation_warns() {
        let input = OptimizeInput {
            funds: vec![
                fund("LONG", wobble2(dec!(0.0005), dec!(0.01), 90)),
                fund("SHORT", wobble3(dec!(0.0004), dec!(0.008), 40)),
            ],
            risk_tolerance: dec!(0.5),
            config: AnalysisConfig::default(),
        };
        let out = optimize_weights(&input).unwrap();
        assert_eq!(out.result.aligned_periods, 40);
        assert!(out.warnings.iter().any(|w| w.contains("truncated")));
    }

    // ------------------------------------------------------------------
    // 7. A one-period overlap is rejected
    // ------------------------------------------------------------------
    #[test]
    fn test_insufficient_overlap() {
        let input = OptimizeInput {
            funds: vec![
                fund("A", wobble2(dec!(0.0005), dec!(0.01), 30)),
                fund("B", vec![dec!(0.01)]),
            ],
            risk_tolerance: dec!(0.5),
            config: AnalysisConfig::default(),
        };
        let result = optimize_weights(&input);
        assert!(matches!(result, Err(FundAnalysisError::InsufficientOverlap(_))));
    }

    // ------------------------------------------------------------------
    // 8. Empty pool and bad tolerance are rejected
    // ------------------------------------------------------------------
    #[test]
    fn test_validation_errors() {
        let empty = OptimizeInput {
            funds: vec![],
            risk_tolerance: dec!(0.5),
            config: AnalysisConfig::default(),
        };
        assert!(matches!(
            optimize_weights(&empty),
            Err(FundAnalysisError::InsufficientData(_))
        ));

        let mut input = two_fund_input(dec!(1.5));
        assert!(optimize_weights(&input).is_err());
        input.risk_tolerance = dec!(-0.1);
        assert!(optimize_weights(&input).is_err());
    }

    // ------------------------------------------------------------------
    // 9. Duplicate fund codes are rejected
    // ------------------------------------------------------------------
    #[test]
    fn test_duplicate_codes_rejected() {
        let input = OptimizeInput {
            funds: vec![
                fund("A", wobble2(dec!(0.0005), dec!(0.01), 30)),
                fund("A", wobble3(dec!(0.0004), dec!(0.01), 30)),
            ],
            risk_tolerance: dec!(0.5),
            config: AnalysisConfig::default(),
        };
        assert!(optimize_weights(&input).is_err());
    }

    // ------------------------------------------------------------------
    // 10. Identical funds split the allocation and ridge-regularise
    // ------------------------------------------------------------------
    #[test]
    fn test_identical_funds_split_evenly() {
        let series = wobble2(dec!(0.0005), dec!(0.01), 50);
        let input = OptimizeInput {
            funds: vec![fund("A", series.clone()), fund("B", series)],
            risk_tolerance: dec!(0.5),
            config: AnalysisConfig::default(),
        };
        let out = optimize_weights(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("ridge")));
        let a = out.result.weights.get("A").unwrap();
        let b = out.result.weights.get("B").unwrap();
        assert!((a - b).abs() < dec!(0.01), "A {} vs B {}", a, b);
    }

    // ------------------------------------------------------------------
    // 11. Singular submatrix surfaces as an optimization failure
    // ------------------------------------------------------------------
    #[test]
    fn test_singular_submatrix_errors() {
        let sigma = vec![vec![Decimal::ZERO; 2]; 2];
        let result = solve_equality_constrained(&sigma, &[dec!(0.1), dec!(0.05)], dec!(1));
        assert!(matches!(result, Err(FundAnalysisError::Optimization(_))));
    }

    // ------------------------------------------------------------------
    // 12. Matrix inverse round-trips
    // ------------------------------------------------------------------
    #[test]
    fn test_matrix_inverse() {
        let a = vec![vec![dec!(2), dec!(1)], vec![dec!(5), dec!(3)]];
        let inv = mat_inverse(&a).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let cell: Decimal = (0..2).map(|k| a[i][k] * inv[k][j]).sum();
                let expected = if i == j { Decimal::ONE } else { Decimal::ZERO };
                assert!((cell - expected).abs() < dec!(0.0000001));
            }
        }
        assert!(mat_inverse(&[vec![Decimal::ZERO]]).is_none());
    }

    // ------------------------------------------------------------------
    // 13. Equal weights helper
    // ------------------------------------------------------------------
    #[test]
    fn test_equal_weights() {
        let w = equal_weights(4);
        assert_eq!(w.len(), 4);
        for wi in &w {
            assert!((wi - dec!(0.25)).abs() < dec!(0.0001));
        }
    }

    // ------------------------------------------------------------------
    // 14. Normalize weights helper
    // ------------------------------------------------------------------
    #[test]
    fn test_normalize_weights() {
        let mut w = vec![dec!(2), dec!(3), dec!(5)];
        normalize_weights(&mut w);
        let total: Decimal = w.iter().sum();
        assert!((total - Decimal::ONE).abs() < dec!(0.000001));
        assert!((w[2] - dec!(0.5)).abs() < dec!(0.000001));
    }

    // ------------------------------------------------------------------
    // 15. Output weights carry every pool fund, zeros included
    // ------------------------------------------------------------------
    #[test]
    fn test_zero_weight_entries_kept() {
        let out = optimize_weights(&two_fund_input(Decimal::ONE)).unwrap();
        assert_eq!(out.result.weights.len(), 2);
        assert!(out.result.weights.get("LOW").is_some());
        assert!(out.result.weights.get("HIGH").is_some());
    }
}
