use anyhow::Result;
use tracing::{info, warn};

use crate::analyzers::aggregate::summarize;
use crate::analyzers::types::SummaryMetrics;
use crate::config::PipelineConfig;
use crate::output::{read_dataset, write_records};
use crate::parser::record_to_raw_row;
use crate::services::table_store::TableStore;
use crate::stats::CoercionWarnings;
use crate::transform::dataset::Dataset;
use crate::transform::features::derive_row;

pub const SUMMARY_METRICS_FILE: &str = "summary_metrics.csv";
pub const CITY_RISK_FILE: &str = "city_risk_distribution.csv";
pub const POLLUTION_TRENDS_FILE: &str = "pollution_trends.csv";
pub const CITY_MEANS_FILE: &str = "city_means.csv";

/// Reads the staged CSV written by the transform step.
pub fn dataset_from_staged(config: &PipelineConfig) -> Result<Dataset> {
    let path = config.staged_csv_path();
    let dataset = read_dataset(&path)?;
    info!(path = %path.display(), rows = dataset.len(), "Staged dataset read");
    Ok(dataset)
}

/// Reads every stored row and derives it again from its inputs.
///
/// Stored `severity`, `aqi_category` and `risk_level` are ignored, so the
/// result never depends on how an earlier run classified a row. Records
/// without a city are skipped.
pub async fn dataset_from_store<S: TableStore + ?Sized>(store: &S) -> Result<Dataset> {
    let records = store.fetch_all().await?;
    let fetched = records.len();

    let mut warnings = CoercionWarnings::default();
    let rows: Vec<_> = records
        .iter()
        .filter_map(record_to_raw_row)
        .map(|raw| derive_row(&raw, &mut warnings))
        .collect();

    if rows.len() < fetched {
        warn!(skipped = fetched - rows.len(), "Stored records without a city were skipped");
    }
    if warnings.total() > 0 {
        warn!(total = warnings.total(), "Stored values were replaced with null");
    }
    info!(rows = rows.len(), "Dataset rebuilt from store");

    Ok(Dataset::from_rows(rows))
}

/// Summarizes the dataset and writes the four report tables into the
/// processed directory.
#[tracing::instrument(skip_all, fields(rows = dataset.len()))]
pub fn analyze(config: &PipelineConfig, dataset: &Dataset) -> Result<SummaryMetrics> {
    let metrics = summarize(dataset)?;

    write_records(&config.report_path(SUMMARY_METRICS_FILE), &[&metrics.kpis])?;
    write_records(&config.report_path(CITY_RISK_FILE), &metrics.city_risk)?;
    write_records(&config.report_path(POLLUTION_TRENDS_FILE), &metrics.trend)?;
    write_records(&config.report_path(CITY_MEANS_FILE), &metrics.city_means)?;

    info!(
        city_highest_pm25 = ?metrics.kpis.city_highest_pm25,
        city_highest_severity = ?metrics.kpis.city_highest_severity,
        worst_hour = ?metrics.kpis.worst_hour,
        high_risk_pct = metrics.kpis.high_risk_pct,
        processed_dir = %config.processed_dir.display(),
        "Analysis complete"
    );

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use crate::transform::category::RiskLevel;
    use crate::transform::types::MeasurementRow;
    use async_trait::async_trait;
    use serde_json::{Map, Value, json};
    use std::fs;

    struct FixedStore(Vec<Value>);

    #[async_trait]
    impl TableStore for FixedStore {
        async fn upsert(&self, _rows: &[MeasurementRow]) -> Result<()> {
            Ok(())
        }

        async fn fetch_all(&self) -> Result<Vec<Map<String, Value>>> {
            Ok(self
                .0
                .iter()
                .filter_map(|v| v.as_object().cloned())
                .collect())
        }
    }

    fn config_in(dir: &std::path::Path) -> PipelineConfig {
        PipelineConfig {
            processed_dir: dir.join("processed"),
            staged_dir: dir.join("staged"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_store_rows_are_rederived() {
        let store = FixedStore(vec![
            json!({
                "city": "lima",
                "time": "2024-01-01T03:00:00",
                "pm2_5": null,
                "pm10": 12.0,
                "aqi_category": "Hazardous",
                "severity": 9999.0,
                "risk_level": "High Risk"
            }),
            json!({"time": "2024-01-01T03:00:00", "pm10": 1.0}),
        ]);

        let dataset = dataset_from_store(&store).await.unwrap();

        assert_eq!(dataset.len(), 1);
        let row = &dataset.rows()[0];
        assert_eq!(row.hour, Some(3));
        assert_eq!(row.aqi_category.as_str(), "Unknown");
        assert!(row.severity.is_null());
        assert_eq!(row.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_analyze_writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let rows = vec![crate::transform::types::RawRow {
            city: "oslo".to_string(),
            time: json!("2024-01-01T08:00"),
            pm2_5: json!(12),
            ..Default::default()
        }];
        let (dataset, _) = Dataset::assemble(vec![rows]);

        analyze(&config, &dataset).unwrap();

        let summary = fs::read_to_string(config.report_path(SUMMARY_METRICS_FILE)).unwrap();
        assert_eq!(
            summary,
            "city_highest_pm25,city_highest_severity,worst_hour,High Risk %,Moderate Risk %,Low Risk %\n\
             oslo,,8,0.0,0.0,100.0\n"
        );

        let risk = fs::read_to_string(config.report_path(CITY_RISK_FILE)).unwrap();
        assert_eq!(risk, "city,Low Risk,Moderate Risk,High Risk\noslo,1,0,0\n");

        let trends = fs::read_to_string(config.report_path(POLLUTION_TRENDS_FILE)).unwrap();
        assert_eq!(trends, "city,time,pm2_5,pm10,ozone\noslo,2024-01-01T08:00:00,12.0,,\n");

        assert!(config.report_path(CITY_MEANS_FILE).exists());
    }

    #[test]
    fn test_analyze_empty_dataset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let err = analyze(&config, &Dataset::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::EmptyDataset)
        ));
        assert!(!config.report_path(SUMMARY_METRICS_FILE).exists());
    }
}
