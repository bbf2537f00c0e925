pub mod backtest;
pub mod error;
pub mod factors;
pub mod optimizer;
pub mod orchestrator;
pub mod risk;
pub mod scoring;
pub mod stats;
pub mod types;

pub use error::FundAnalysisError;
pub use types::*;

/// Standard result type for all fund-analysis operations
pub type FundAnalysisResult<T> = Result<T, FundAnalysisError>;
