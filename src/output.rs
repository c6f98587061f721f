//! CSV persistence for the staged dataset and the analysis reports.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::transform::dataset::Dataset;
use crate::transform::types::MeasurementRow;

/// Column order of the staged artifact.
pub const STAGED_COLUMNS: [&str; 13] = [
    "city",
    "time",
    "hour",
    "pm10",
    "pm2_5",
    "carbon_monoxide",
    "nitrogen_dioxide",
    "sulphur_dioxide",
    "ozone",
    "uv_index",
    "aqi_category",
    "severity",
    "risk_level",
];

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("creating {}", path.display()))
}

/// Writes the dataset as CSV. The header is always written, even for an
/// empty dataset.
pub fn write_dataset_to<W: Write>(writer: W, dataset: &Dataset) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(STAGED_COLUMNS)?;
    for row in dataset.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Overwrites `path` with the staged dataset.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    debug!(path = %path.display(), rows = dataset.len(), "Writing staged dataset");
    write_dataset_to(create_file(path)?, dataset)
}

/// Reads a staged CSV back into a [`Dataset`].
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening staged dataset {}", path.display()))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: MeasurementRow = result?;
        rows.push(row);
    }

    Ok(Dataset::from_rows(rows))
}

/// Overwrites `path` with one CSV row per record, headers taken from the
/// record's field names.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(create_file(path)?);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = records.len(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::types::RawRow;
    use serde_json::json;

    fn sample_dataset() -> Dataset {
        let rows = vec![
            RawRow {
                city: "accra".to_string(),
                time: json!("2024-01-01T00:00"),
                pm2_5: json!(30),
                pm10: json!(10),
                ..Default::default()
            },
            RawRow {
                city: "accra".to_string(),
                time: json!("2024-01-01T01:00"),
                pm2_5: json!(250),
                pm10: json!(50),
                nitrogen_dioxide: json!(20),
                sulphur_dioxide: json!(10),
                carbon_monoxide: json!(5),
                ozone: json!(15),
                uv_index: json!(2.5),
            },
        ];
        Dataset::assemble(vec![rows]).0
    }

    fn to_string(dataset: &Dataset) -> String {
        let mut buf = Vec::new();
        write_dataset_to(&mut buf, dataset).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_matches_column_order() {
        let content = to_string(&Dataset::default());
        assert_eq!(
            content.trim_end(),
            "city,time,hour,pm10,pm2_5,carbon_monoxide,nitrogen_dioxide,sulphur_dioxide,\
             ozone,uv_index,aqi_category,severity,risk_level"
        );
    }

    #[test]
    fn test_nulls_are_empty_fields() {
        let content = to_string(&sample_dataset());
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "accra,2024-01-01T00:00:00,0,10.0,30.0,,,,,,Good,,Low Risk"
        );
        assert_eq!(
            lines[2],
            "accra,2024-01-01T01:00:00,1,50.0,250.0,5.0,20.0,10.0,15.0,2.5,Unhealthy,1575.0,High Risk"
        );
    }

    #[test]
    fn test_write_then_read_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staged/air_quality_transformed.csv");
        let dataset = sample_dataset();

        write_dataset(&path, &dataset).unwrap();
        let read_back = read_dataset(&path).unwrap();

        assert_eq!(read_back, dataset);
    }

    #[test]
    fn test_write_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staged.csv");

        write_dataset(&path, &sample_dataset()).unwrap();
        write_dataset(&path, &sample_dataset()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_write_records_writes_header_once() {
        #[derive(Serialize)]
        struct Row {
            city: &'static str,
            count: usize,
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_records(&path, &[Row { city: "a", count: 1 }, Row { city: "b", count: 2 }]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "city,count\na,1\nb,2\n");
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&crate::stats::TransformStats::default()).unwrap();
    }
}
