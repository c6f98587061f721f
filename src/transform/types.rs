//! Row types flowing through the transform.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::measure::Measure;
use crate::transform::category::{AqiCategory, RiskLevel};

/// One timestamp of one city's payload, cells still untyped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub city: String,
    pub time: Value,
    pub pm10: Value,
    pub pm2_5: Value,
    pub carbon_monoxide: Value,
    pub nitrogen_dioxide: Value,
    pub sulphur_dioxide: Value,
    pub ozone: Value,
    pub uv_index: Value,
}

/// A fully derived row of the staged dataset.
///
/// Field order is the column order of the staged CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub city: String,
    #[serde(with = "iso_time")]
    pub time: Option<NaiveDateTime>,
    pub hour: Option<u32>,
    pub pm10: Measure,
    pub pm2_5: Measure,
    pub carbon_monoxide: Measure,
    pub nitrogen_dioxide: Measure,
    pub sulphur_dioxide: Measure,
    pub ozone: Measure,
    pub uv_index: Measure,
    pub aqi_category: AqiCategory,
    pub severity: Measure,
    pub risk_level: RiskLevel,
}

pub(crate) mod iso_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::transform::features::parse_time;

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_time))
    }
}
