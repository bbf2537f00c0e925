pub mod assessment;
pub mod exposure;
pub mod stress;

use serde::{Deserialize, Serialize};

use crate::types::RiskMetrics;

/// Complete portfolio risk report assembled by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub risk_metrics: RiskMetrics,
    pub risk_assessment: assessment::RiskAssessment,
    pub stress_test: Vec<stress::StressResult>,
    pub exposure: exposure::ExposureAnalysis,
}
