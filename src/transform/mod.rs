//! Raw payloads to staged dataset.
//!
//! Each `<city>_raw_<suffix>.json` file in the raw directory is parsed into
//! raw rows, every row is derived and filtered into a [`Dataset`], and the
//! dataset is written to the staged CSV. A payload that cannot be read or
//! parsed is recorded as a failure for its city; the other cities are still
//! staged.

pub mod category;
pub mod dataset;
pub mod features;
pub mod types;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::error::EtlError;
use crate::output::write_dataset;
use crate::parser::parse_payload;
use crate::stats::TransformStats;
use dataset::Dataset;
use types::RawRow;

const RAW_MARKER: &str = "_raw_";

/// A raw payload file and the city it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFile {
    pub city: String,
    pub path: PathBuf,
}

/// Result of one transform run.
#[derive(Debug)]
pub struct TransformOutcome {
    pub dataset: Dataset,
    pub stats: TransformStats,
    pub failures: Vec<EtlError>,
    pub staged_path: PathBuf,
}

/// Extracts the city from a `<city>_raw_<suffix>.json` file name.
pub fn city_from_file_name(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(".json")?;
    stem.split_once(RAW_MARKER).map(|(city, _)| city)
}

/// Lists payload files in `raw_dir`, sorted by file name so that the city
/// order of the dataset never depends on directory enumeration.
pub fn discover_payloads(raw_dir: &Path) -> Result<Vec<PayloadFile>> {
    let mut files = Vec::new();

    let entries = fs::read_dir(raw_dir)
        .with_context(|| format!("reading raw directory {}", raw_dir.display()))?;

    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(city) = city_from_file_name(name) {
            files.push(PayloadFile {
                city: city.to_string(),
                path: entry.path(),
            });
        }
    }

    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(files)
}

fn load_payload_file(file: &PayloadFile) -> Result<Vec<RawRow>, EtlError> {
    let bytes = fs::read(&file.path).map_err(|source| EtlError::PayloadRead {
        city: file.city.clone(),
        path: file.path.clone(),
        source,
    })?;
    parse_payload(&bytes, &file.city)
}

/// Parses every payload, collecting per-city failures instead of stopping.
pub fn load_payloads(files: &[PayloadFile]) -> (Vec<Vec<RawRow>>, Vec<EtlError>) {
    let mut batches = Vec::new();
    let mut failures = Vec::new();

    for file in files {
        match load_payload_file(file) {
            Ok(rows) => {
                info!(city = %file.city, path = %file.path.display(), rows = rows.len(), "Payload loaded");
                batches.push(rows);
            }
            Err(e) => {
                error!(city = %file.city, path = %file.path.display(), error = %e, "Payload rejected");
                failures.push(e);
            }
        }
    }

    (batches, failures)
}

/// Runs the transform step end to end and writes the staged CSV.
#[tracing::instrument(skip(config), fields(raw_dir = %config.raw_dir.display()))]
pub fn run_transform(config: &PipelineConfig) -> Result<TransformOutcome> {
    let files = discover_payloads(&config.raw_dir)?;
    if files.is_empty() {
        warn!("No raw payload files found");
    }

    let (batches, failures) = load_payloads(&files);
    let (dataset, mut stats) = Dataset::assemble(batches);
    stats.failed_cities = failures.len();

    if stats.coercion.total() > 0 {
        warn!(
            total = stats.coercion.total(),
            warnings = ?stats.coercion,
            "Unparseable values were replaced with null"
        );
    }

    let staged_path = config.staged_csv_path();
    write_dataset(&staged_path, &dataset)?;

    info!(
        cities = stats.cities,
        failed_cities = stats.failed_cities,
        raw_rows = stats.raw_rows,
        retained = stats.retained_rows,
        dropped = stats.dropped_rows,
        retained_pct = stats.retained_pct(),
        path = %staged_path.display(),
        "Transformation complete"
    );

    Ok(TransformOutcome {
        dataset,
        stats,
        failures,
        staged_path,
    })
}
