//! Threshold classifiers for PM2.5 and the severity score.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::measure::Measure;

/// Air-quality category derived from PM2.5 alone.
///
/// | PM2.5       | Category       |
/// |-------------|----------------|
/// | <= 50       | Good           |
/// | <= 100      | Moderate       |
/// | <= 200      | Unhealthy      |
/// | <= 300      | Very Unhealthy |
/// | > 300       | Hazardous      |
/// | missing     | Unknown        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
    Unknown,
}

impl AqiCategory {
    pub fn from_pm25(pm2_5: Measure) -> Self {
        match pm2_5.value() {
            None => AqiCategory::Unknown,
            Some(v) if v <= 50.0 => AqiCategory::Good,
            Some(v) if v <= 100.0 => AqiCategory::Moderate,
            Some(v) if v <= 200.0 => AqiCategory::Unhealthy,
            Some(v) if v <= 300.0 => AqiCategory::VeryUnhealthy,
            Some(_) => AqiCategory::Hazardous,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
            AqiCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk classification derived from the severity score alone.
///
/// Thresholds are exclusive: a severity of exactly 200 is still low risk.
/// A missing severity is classified as low risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskLevel {
    pub fn from_severity(severity: Measure) -> Self {
        match severity.value() {
            Some(v) if v > 400.0 => RiskLevel::High,
            Some(v) if v > 200.0 => RiskLevel::Moderate,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
