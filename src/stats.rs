use serde::Serialize;

use crate::analyzers::utility::pct;

/// Per-column count of non-null input values that could not be coerced and
/// were replaced with null.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CoercionWarnings {
    pub time: usize,
    pub pm10: usize,
    pub pm2_5: usize,
    pub carbon_monoxide: usize,
    pub nitrogen_dioxide: usize,
    pub sulphur_dioxide: usize,
    pub ozone: usize,
    pub uv_index: usize,
}

impl CoercionWarnings {
    pub fn total(&self) -> usize {
        self.time
            + self.pm10
            + self.pm2_5
            + self.carbon_monoxide
            + self.nitrogen_dioxide
            + self.sulphur_dioxide
            + self.ozone
            + self.uv_index
    }
}

/// Counters for one transform run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TransformStats {
    pub cities: usize,
    pub failed_cities: usize,
    pub raw_rows: usize,
    pub retained_rows: usize,
    pub dropped_rows: usize,
    pub coercion: CoercionWarnings,
}

impl TransformStats {
    pub fn retained_pct(&self) -> f64 {
        pct(self.retained_rows, self.raw_rows)
    }
}
