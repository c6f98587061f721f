//! Data types produced by the aggregation step.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::measure::Measure;

/// Headline indicators, written as the single row of `summary_metrics.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub city_highest_pm25: Option<String>,
    pub city_highest_severity: Option<String>,
    pub worst_hour: Option<u32>,
    #[serde(rename = "High Risk %")]
    pub high_risk_pct: f64,
    #[serde(rename = "Moderate Risk %")]
    pub moderate_risk_pct: f64,
    #[serde(rename = "Low Risk %")]
    pub low_risk_pct: f64,
}

/// Mean of each pollutant and of severity for one city. Nulls are skipped;
/// a column with no values has no mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityMeans {
    pub city: String,
    pub rows: usize,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub carbon_monoxide: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub sulphur_dioxide: Option<f64>,
    pub ozone: Option<f64>,
    pub severity: Option<f64>,
}

/// Row counts per risk level for one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityRiskCounts {
    pub city: String,
    #[serde(rename = "Low Risk")]
    pub low: usize,
    #[serde(rename = "Moderate Risk")]
    pub moderate: usize,
    #[serde(rename = "High Risk")]
    pub high: usize,
}

/// One row of the trend projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub city: String,
    #[serde(with = "crate::transform::types::iso_time")]
    pub time: Option<NaiveDateTime>,
    pub pm2_5: Measure,
    pub pm10: Measure,
    pub ozone: Measure,
}

/// Everything the reports are built from. Recomputed on every analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub kpis: Kpis,
    pub city_means: Vec<CityMeans>,
    pub city_risk: Vec<CityRiskCounts>,
    pub trend: Vec<TrendPoint>,
}
