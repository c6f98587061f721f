//! Batched hand-off of the staged dataset to a [`TableStore`].
//!
//! A rejected batch is logged and recorded, and the remaining batches are
//! still sent. The report reconciles `inserted/total` at the end.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::EtlError;
use crate::services::table_store::TableStore;
use crate::transform::types::MeasurementRow;

#[derive(Debug, Default)]
pub struct LoadReport {
    pub total: usize,
    pub inserted: usize,
    pub failures: Vec<EtlError>,
}

/// Compact form of a [`LoadReport`] for logging.
#[derive(Debug, Serialize)]
pub struct LoadSummary {
    pub total: usize,
    pub inserted: usize,
    pub failed_batches: usize,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.inserted == self.total
    }

    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            total: self.total,
            inserted: self.inserted,
            failed_batches: self.failures.len(),
        }
    }
}

/// Upserts `rows` in batches of `batch_size`. Batches are numbered from 1.
#[tracing::instrument(skip(store, rows), fields(total = rows.len()))]
pub async fn load_dataset<S: TableStore + ?Sized>(
    store: &S,
    rows: &[MeasurementRow],
    batch_size: usize,
) -> LoadReport {
    let batch_size = batch_size.max(1);
    let mut report = LoadReport {
        total: rows.len(),
        ..Default::default()
    };

    for (i, batch) in rows.chunks(batch_size).enumerate() {
        let number = i + 1;
        match store.upsert(batch).await {
            Ok(()) => {
                report.inserted += batch.len();
                info!(batch = number, rows = batch.len(), "Batch upserted");
            }
            Err(e) => {
                error!(batch = number, rows = batch.len(), error = %e, "Batch failed");
                report.failures.push(EtlError::SinkBatch {
                    batch: number,
                    rows: batch.len(),
                    message: format!("{e:#}"),
                });
            }
        }
    }

    if report.is_complete() {
        info!(inserted = report.inserted, total = report.total, "Load finished");
    } else {
        warn!(
            inserted = report.inserted,
            total = report.total,
            failed_batches = report.failures.len(),
            "Load finished with failures"
        );
    }

    report
}
