//! Trait for the tabular store the staged dataset is handed off to.

use anyhow::Result;
use serde_json::{Map, Value};

use crate::transform::types::MeasurementRow;

/// Abstraction over an upsert-capable table keyed by `(city, time)`
/// (e.g., a Supabase table).
#[async_trait::async_trait]
pub trait TableStore: Send + Sync {
    /// Inserts or replaces one batch of rows.
    async fn upsert(&self, rows: &[MeasurementRow]) -> Result<()>;

    /// Returns every stored record as a JSON object.
    async fn fetch_all(&self) -> Result<Vec<Map<String, Value>>>;
}
