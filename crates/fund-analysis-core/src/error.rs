use thiserror::Error;

#[derive(Debug, Error)]
pub enum FundAnalysisError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Insufficient overlap: {0}")]
    InsufficientOverlap(String),

    #[error("Optimization failure: {0}")]
    Optimization(String),

    #[error("Backtest input error: {0}")]
    BacktestInput(String),

    #[error("Risk assessment error: {0}")]
    RiskAssessment(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FundAnalysisError {
    fn from(e: serde_json::Error) -> Self {
        FundAnalysisError::Serialization(e.to_string())
    }
}
