use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FundAnalysisError;
use crate::FundAnalysisResult;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Tolerance on the sum of externally supplied portfolio weights.
pub const WEIGHT_SUM_TOLERANCE: Decimal = dec!(0.001);

/// Frequency of return observations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl ReturnFrequency {
    /// Number of periods in a year for annualisation
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            ReturnFrequency::Daily => dec!(252),
            ReturnFrequency::Weekly => dec!(52),
            ReturnFrequency::Monthly => dec!(12),
            ReturnFrequency::Quarterly => dec!(4),
            ReturnFrequency::Annual => dec!(1),
        }
    }

    /// Periods per year as a window length
    pub fn period_count(&self) -> usize {
        match self {
            ReturnFrequency::Daily => 252,
            ReturnFrequency::Weekly => 52,
            ReturnFrequency::Monthly => 12,
            ReturnFrequency::Quarterly => 4,
            ReturnFrequency::Annual => 1,
        }
    }
}

/// Shared configuration for all analytical operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Observation frequency of the input return series
    pub frequency: ReturnFrequency,
    /// Risk-free rate (annualised)
    pub risk_free_rate: Rate,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            frequency: ReturnFrequency::Daily,
            risk_free_rate: Decimal::ZERO,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeriesData {
    Bare(Vec<Decimal>),
    Dated {
        returns: Vec<Decimal>,
        #[serde(default)]
        dates: Option<Vec<NaiveDate>>,
    },
}

/// A validated, immutable series of periodic fractional returns for one fund.
///
/// Invariants: non-empty, every return > -1, and when dates are present they
/// are one per return and strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesData")]
pub struct ReturnSeries {
    returns: Vec<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dates: Option<Vec<NaiveDate>>,
}

impl ReturnSeries {
    pub fn new(returns: Vec<Decimal>) -> FundAnalysisResult<Self> {
        Self::build(returns, None)
    }

    pub fn with_dates(returns: Vec<Decimal>, dates: Vec<NaiveDate>) -> FundAnalysisResult<Self> {
        Self::build(returns, Some(dates))
    }

    fn build(returns: Vec<Decimal>, dates: Option<Vec<NaiveDate>>) -> FundAnalysisResult<Self> {
        if returns.is_empty() {
            return Err(FundAnalysisError::InsufficientData(
                "return series must not be empty".into(),
            ));
        }

        for (i, r) in returns.iter().enumerate() {
            if *r <= dec!(-1) {
                return Err(FundAnalysisError::InvalidInput {
                    field: "returns".into(),
                    reason: format!("period {} return {} must be greater than -1", i, r),
                });
            }
        }

        if let Some(ref d) = dates {
            if d.len() != returns.len() {
                return Err(FundAnalysisError::InvalidInput {
                    field: "dates".into(),
                    reason: format!("{} dates for {} returns", d.len(), returns.len()),
                });
            }
            for pair in d.windows(2) {
                if pair[1] <= pair[0] {
                    return Err(FundAnalysisError::InvalidInput {
                        field: "dates".into(),
                        reason: format!("dates must be strictly increasing: {} follows {}", pair[1], pair[0]),
                    });
                }
            }
        }

        Ok(ReturnSeries { returns, dates })
    }

    pub fn returns(&self) -> &[Decimal] {
        &self.returns
    }

    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.dates.as_deref()
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// The trailing `n` observations as a new series. `n` is clamped to the
    /// series length.
    pub fn trailing(&self, n: usize) -> ReturnSeries {
        let n = n.min(self.returns.len()).max(1);
        let start = self.returns.len() - n;
        ReturnSeries {
            returns: self.returns[start..].to_vec(),
            dates: self.dates.as_ref().map(|d| d[start..].to_vec()),
        }
    }
}

impl TryFrom<SeriesData> for ReturnSeries {
    type Error = FundAnalysisError;

    fn try_from(data: SeriesData) -> Result<Self, Self::Error> {
        match data {
            SeriesData::Bare(returns) => ReturnSeries::new(returns),
            SeriesData::Dated { returns, dates } => match dates {
                Some(d) => ReturnSeries::with_dates(returns, d),
                None => ReturnSeries::new(returns),
            },
        }
    }
}

/// One fund's code and return history, the unit of a fund pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundReturns {
    pub fund_code: String,
    pub returns: ReturnSeries,
}

/// A single fund's allocation within a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundWeight {
    pub fund_code: String,
    pub weight: Decimal,
}

/// Portfolio allocation: one entry per pool fund (zero weights kept), sorted
/// by fund code, weights non-negative and summing to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioWeights {
    entries: Vec<FundWeight>,
}

impl PortfolioWeights {
    pub fn new(mut entries: Vec<FundWeight>) -> FundAnalysisResult<Self> {
        entries.sort_by(|a, b| a.fund_code.cmp(&b.fund_code));
        let weights = PortfolioWeights { entries };
        weights.validate()?;
        Ok(weights)
    }

    /// Check the data-model invariants on externally supplied weights.
    pub fn validate(&self) -> FundAnalysisResult<()> {
        if self.entries.is_empty() {
            return Err(FundAnalysisError::InvalidInput {
                field: "weights".into(),
                reason: "at least one weight entry required".into(),
            });
        }

        let mut codes: Vec<&str> = self.entries.iter().map(|e| e.fund_code.as_str()).collect();
        codes.sort_unstable();
        for pair in codes.windows(2) {
            if pair[0] == pair[1] {
                return Err(FundAnalysisError::InvalidInput {
                    field: "weights".into(),
                    reason: format!("duplicate fund code {}", pair[0]),
                });
            }
        }

        for entry in &self.entries {
            if entry.weight < Decimal::ZERO {
                return Err(FundAnalysisError::InvalidInput {
                    field: "weights".into(),
                    reason: format!("{} has negative weight {}", entry.fund_code, entry.weight),
                });
            }
        }

        let total = self.sum();
        if (total - Decimal::ONE).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(FundAnalysisError::InvalidInput {
                field: "weights".into(),
                reason: format!("weights sum to {}, expected 1", total),
            });
        }

        Ok(())
    }

    pub fn entries(&self) -> &[FundWeight] {
        &self.entries
    }

    pub fn get(&self, fund_code: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|e| e.fund_code == fund_code)
            .map(|e| e.weight)
    }

    pub fn sum(&self) -> Decimal {
        self.entries.iter().map(|e| e.weight).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Portfolio-level performance and risk scalars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub total_return: Rate,
    pub annual_return: Rate,
    pub volatility: Rate,
    pub sharpe_ratio: Decimal,
    pub max_drawdown: Rate,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_return_series_rejects_empty() {
        assert!(ReturnSeries::new(vec![]).is_err());
    }

    #[test]
    fn test_return_series_rejects_total_loss() {
        assert!(ReturnSeries::new(vec![dec!(0.01), dec!(-1)]).is_err());
        assert!(ReturnSeries::new(vec![dec!(-1.5)]).is_err());
    }

    #[test]
    fn test_return_series_rejects_duplicate_dates() {
        let result = ReturnSeries::with_dates(
            vec![dec!(0.01), dec!(0.02)],
            vec![date(2024, 1, 2), date(2024, 1, 2)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_return_series_rejects_date_length_mismatch() {
        let result = ReturnSeries::with_dates(vec![dec!(0.01), dec!(0.02)], vec![date(2024, 1, 2)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_return_series_trailing() {
        let series = ReturnSeries::with_dates(
            vec![dec!(0.01), dec!(0.02), dec!(0.03)],
            vec![date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 4)],
        )
        .unwrap();
        let tail = series.trailing(2);
        assert_eq!(tail.returns(), &[dec!(0.02), dec!(0.03)]);
        assert_eq!(tail.dates().unwrap(), &[date(2024, 1, 3), date(2024, 1, 4)]);
    }

    #[test]
    fn test_return_series_deserializes_from_bare_array() {
        let series: ReturnSeries = serde_json::from_str("[0.01, -0.02, 0.03]").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.returns()[1], dec!(-0.02));
    }

    #[test]
    fn test_return_series_deserialize_validates() {
        let result: Result<ReturnSeries, _> = serde_json::from_str("[]");
        assert!(result.is_err());
    }

    #[test]
    fn test_portfolio_weights_sorted_and_validated() {
        let weights = PortfolioWeights::new(vec![
            FundWeight { fund_code: "B".into(), weight: dec!(0.4) },
            FundWeight { fund_code: "A".into(), weight: dec!(0.6) },
        ])
        .unwrap();
        assert_eq!(weights.entries()[0].fund_code, "A");
        assert_eq!(weights.get("B"), Some(dec!(0.4)));
        assert_eq!(weights.sum(), Decimal::ONE);
    }

    #[test]
    fn test_portfolio_weights_rejects_bad_sum() {
        let result = PortfolioWeights::new(vec![
            FundWeight { fund_code: "A".into(), weight: dec!(0.5) },
            FundWeight { fund_code: "B".into(), weight: dec!(0.2) },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_portfolio_weights_rejects_negative() {
        let result = PortfolioWeights::new(vec![
            FundWeight { fund_code: "A".into(), weight: dec!(1.2) },
            FundWeight { fund_code: "B".into(), weight: dec!(-0.2) },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_portfolio_weights_rejects_duplicates() {
        let result = PortfolioWeights::new(vec![
            FundWeight { fund_code: "A".into(), weight: dec!(0.5) },
            FundWeight { fund_code: "A".into(), weight: dec!(0.5) },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_frequency_periods_per_year() {
        assert_eq!(ReturnFrequency::Daily.periods_per_year(), dec!(252));
        assert_eq!(ReturnFrequency::Monthly.periods_per_year(), dec!(12));
        assert_eq!(ReturnFrequency::Annual.period_count(), 1);
    }
}
