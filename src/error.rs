//! Domain errors raised by the transform, aggregation and load steps.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    /// A raw payload was not a JSON object or had no `hourly.time` array.
    #[error("malformed payload for city '{city}': {reason}")]
    MalformedPayload { city: String, reason: String },

    /// Aggregation was requested on a dataset with zero rows.
    #[error("dataset is empty, nothing to aggregate")]
    EmptyDataset,

    /// One batch of an upsert run was rejected by the store.
    #[error("batch {batch} ({rows} rows) failed: {message}")]
    SinkBatch {
        batch: usize,
        rows: usize,
        message: String,
    },

    /// A raw payload file could not be read.
    #[error("cannot read payload for city '{city}' at {}: {source}", path.display())]
    PayloadRead {
        city: String,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl EtlError {
    pub(crate) fn malformed(city: &str, reason: impl Into<String>) -> Self {
        EtlError::MalformedPayload {
            city: city.to_string(),
            reason: reason.into(),
        }
    }
}
