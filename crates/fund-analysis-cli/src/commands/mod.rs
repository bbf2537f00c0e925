pub mod analyze;
pub mod backtest;
pub mod factors;
pub mod optimize;
pub mod risk;

use fund_analysis_core::types::ReturnFrequency;

/// Map a frequency flag onto the core's return frequency.
pub fn parse_frequency(frequency: &str) -> Result<ReturnFrequency, Box<dyn std::error::Error>> {
    match frequency.to_lowercase().as_str() {
        "daily" => Ok(ReturnFrequency::Daily),
        "weekly" => Ok(ReturnFrequency::Weekly),
        "monthly" => Ok(ReturnFrequency::Monthly),
        "quarterly" => Ok(ReturnFrequency::Quarterly),
        "annual" | "annually" => Ok(ReturnFrequency::Annual),
        _ => Err(format!(
            "Unknown frequency '{}'. Use: daily, weekly, monthly, quarterly, annual",
            frequency
        )
        .into()),
    }
}
