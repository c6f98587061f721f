//! Per-row feature derivation.
//!
//! Every derived field of a [`MeasurementRow`] depends only on the inputs of
//! that same row, so rows can be derived in any order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;
use tracing::debug;

use crate::measure::Measure;
use crate::stats::CoercionWarnings;
use crate::transform::category::{AqiCategory, RiskLevel};
use crate::transform::types::{MeasurementRow, RawRow};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parses a timestamp string. An offset is dropped and the wall-clock time
/// kept; a bare date is read as midnight. Returns `None` for anything else.
pub fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    for format in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(t);
        }
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.naive_local());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Coerces a JSON cell to a number.
///
/// JSON `null` is a legitimate missing value and yields `Some(Measure::NULL)`.
/// `None` means the cell held something that could not be read as a number.
pub fn coerce_numeric(value: &Value) -> Option<Measure> {
    match value {
        Value::Null => Some(Measure::NULL),
        Value::Number(n) => n.as_f64().map(Measure::finite).filter(|m| !m.is_null()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .map(Measure::finite)
            .filter(|m| !m.is_null()),
        _ => None,
    }
}

/// Same contract as [`coerce_numeric`], for the `time` cell.
pub fn coerce_time(value: &Value) -> Option<Option<NaiveDateTime>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => parse_time(s).map(Some),
        _ => None,
    }
}

/// Weighted pollutant sum. Null if any operand is null.
pub fn severity(
    pm2_5: Measure,
    pm10: Measure,
    nitrogen_dioxide: Measure,
    sulphur_dioxide: Measure,
    carbon_monoxide: Measure,
    ozone: Measure,
) -> Measure {
    pm2_5 * 5.0
        + pm10 * 3.0
        + nitrogen_dioxide * 4.0
        + sulphur_dioxide * 4.0
        + carbon_monoxide * 2.0
        + ozone * 3.0
}

fn numeric(city: &str, column: &str, value: &Value, failures: &mut usize) -> Measure {
    coerce_numeric(value).unwrap_or_else(|| {
        *failures += 1;
        debug!(city, column, value = %value, "Value coerced to null");
        Measure::NULL
    })
}

/// Derives a [`MeasurementRow`] from a raw row, counting coercion failures
/// into `warnings`.
pub fn derive_row(raw: &RawRow, warnings: &mut CoercionWarnings) -> MeasurementRow {
    let city = raw.city.as_str();

    let time = coerce_time(&raw.time).unwrap_or_else(|| {
        warnings.time += 1;
        debug!(city, value = %raw.time, "Timestamp coerced to null");
        None
    });
    let hour = time.map(|t| t.hour());

    let pm10 = numeric(city, "pm10", &raw.pm10, &mut warnings.pm10);
    let pm2_5 = numeric(city, "pm2_5", &raw.pm2_5, &mut warnings.pm2_5);
    let carbon_monoxide = numeric(
        city,
        "carbon_monoxide",
        &raw.carbon_monoxide,
        &mut warnings.carbon_monoxide,
    );
    let nitrogen_dioxide = numeric(
        city,
        "nitrogen_dioxide",
        &raw.nitrogen_dioxide,
        &mut warnings.nitrogen_dioxide,
    );
    let sulphur_dioxide = numeric(
        city,
        "sulphur_dioxide",
        &raw.sulphur_dioxide,
        &mut warnings.sulphur_dioxide,
    );
    let ozone = numeric(city, "ozone", &raw.ozone, &mut warnings.ozone);
    let uv_index = numeric(city, "uv_index", &raw.uv_index, &mut warnings.uv_index);

    let severity = severity(
        pm2_5,
        pm10,
        nitrogen_dioxide,
        sulphur_dioxide,
        carbon_monoxide,
        ozone,
    );

    MeasurementRow {
        city: raw.city.clone(),
        time,
        hour,
        pm10,
        pm2_5,
        carbon_monoxide,
        nitrogen_dioxide,
        sulphur_dioxide,
        ozone,
        uv_index,
        aqi_category: AqiCategory::from_pm25(pm2_5),
        severity,
        risk_level: RiskLevel::from_severity(severity),
    }
}
