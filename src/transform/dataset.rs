use tracing::debug;

use crate::stats::TransformStats;
use crate::transform::features::derive_row;
use crate::transform::types::{MeasurementRow, RawRow};

/// The staged dataset: derived rows in city-arrival order, then original
/// per-city order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<MeasurementRow>,
}

impl Dataset {
    /// Derives and filters every row of every city batch.
    ///
    /// Rows whose `pm2_5`, `pm10`, `ozone` and `nitrogen_dioxide` are all
    /// missing are dropped. Identical input always produces an identical
    /// dataset.
    pub fn assemble<I>(city_batches: I) -> (Self, TransformStats)
    where
        I: IntoIterator<Item = Vec<RawRow>>,
    {
        let mut stats = TransformStats::default();
        let mut rows = Vec::new();

        for batch in city_batches {
            stats.cities += 1;
            stats.raw_rows += batch.len();

            for raw in &batch {
                let row = derive_row(raw, &mut stats.coercion);
                if is_retained(&row) {
                    rows.push(row);
                } else {
                    stats.dropped_rows += 1;
                }
            }
        }

        stats.retained_rows = rows.len();
        debug!(
            raw_rows = stats.raw_rows,
            retained = stats.retained_rows,
            dropped = stats.dropped_rows,
            "Dataset assembled"
        );

        (Self { rows }, stats)
    }

    /// Wraps rows that were already derived, e.g. read back from the staged CSV.
    pub fn from_rows(rows: Vec<MeasurementRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A row survives if at least one of the headline pollutants is present.
pub fn is_retained(row: &MeasurementRow) -> bool {
    !(row.pm2_5.is_null()
        && row.pm10.is_null()
        && row.ozone.is_null()
        && row.nitrogen_dioxide.is_null())
}
