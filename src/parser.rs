//! Parser for raw per-city hourly payloads.
//!
//! A payload looks like `{"hourly": {"time": [...], "pm10": [...], ...}}`,
//! with every array aligned by index to `time`.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::EtlError;
use crate::transform::types::RawRow;

#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    #[serde(default)]
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Option<Vec<Value>>,
    #[serde(default)]
    pm10: Option<Value>,
    #[serde(default)]
    pm2_5: Option<Value>,
    #[serde(default)]
    carbon_monoxide: Option<Value>,
    #[serde(default)]
    nitrogen_dioxide: Option<Value>,
    #[serde(default)]
    sulphur_dioxide: Option<Value>,
    #[serde(default)]
    ozone: Option<Value>,
    #[serde(default)]
    uv_index: Option<Value>,
}

/// Decodes a raw payload and flattens it into one [`RawRow`] per timestamp.
///
/// # Errors
///
/// Returns [`EtlError::MalformedPayload`] if the bytes are not a JSON object
/// or the object has no `hourly.time` array. Other columns never fail the
/// payload.
pub fn parse_payload(bytes: &[u8], city: &str) -> Result<Vec<RawRow>, EtlError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| EtlError::malformed(city, format!("invalid JSON: {e}")))?;

    if !value.is_object() {
        return Err(EtlError::malformed(city, "payload is not a JSON object"));
    }

    let payload = RawPayload::deserialize(value)
        .map_err(|e| EtlError::malformed(city, format!("unexpected payload shape: {e}")))?;

    let hourly = payload
        .hourly
        .ok_or_else(|| EtlError::malformed(city, "missing `hourly` block"))?;

    flatten_hourly(hourly, city)
}

fn flatten_hourly(hourly: HourlyBlock, city: &str) -> Result<Vec<RawRow>, EtlError> {
    let time = hourly
        .time
        .ok_or_else(|| EtlError::malformed(city, "missing `hourly.time` array"))?;
    let len = time.len();

    let mut pm10 = aligned(hourly.pm10, len, city, "pm10");
    let mut pm2_5 = aligned(hourly.pm2_5, len, city, "pm2_5");
    let mut carbon_monoxide = aligned(hourly.carbon_monoxide, len, city, "carbon_monoxide");
    let mut nitrogen_dioxide = aligned(hourly.nitrogen_dioxide, len, city, "nitrogen_dioxide");
    let mut sulphur_dioxide = aligned(hourly.sulphur_dioxide, len, city, "sulphur_dioxide");
    let mut ozone = aligned(hourly.ozone, len, city, "ozone");
    let mut uv_index = aligned(hourly.uv_index, len, city, "uv_index");

    let rows = time
        .into_iter()
        .enumerate()
        .map(|(i, time)| RawRow {
            city: city.to_string(),
            time,
            pm10: pm10[i].take(),
            pm2_5: pm2_5[i].take(),
            carbon_monoxide: carbon_monoxide[i].take(),
            nitrogen_dioxide: nitrogen_dioxide[i].take(),
            sulphur_dioxide: sulphur_dioxide[i].take(),
            ozone: ozone[i].take(),
            uv_index: uv_index[i].take(),
        })
        .collect();

    Ok(rows)
}

/// Pads with nulls or truncates a column so it lines up with `time`.
/// An absent column becomes all nulls, a scalar is repeated on every row and
/// an object is ignored.
fn aligned(column: Option<Value>, len: usize, city: &str, name: &str) -> Vec<Value> {
    let mut values = match column {
        None => return vec![Value::Null; len],
        Some(Value::Array(values)) => values,
        Some(Value::Object(_)) => {
            warn!(city, column = name, "Column is an object, treating as missing");
            return vec![Value::Null; len];
        }
        Some(scalar) => {
            if !scalar.is_null() {
                warn!(city, column = name, value = %scalar, "Column is a scalar, repeating it");
            }
            return vec![scalar; len];
        }
    };

    if values.len() != len {
        warn!(
            city,
            column = name,
            expected = len,
            actual = values.len(),
            "Column length differs from time array, aligning"
        );
        values.resize(len, Value::Null);
    }

    values
}

/// Rebuilds a [`RawRow`] from a record previously written to the store.
///
/// Returns `None` if the record has no string `city`.
pub fn record_to_raw_row(record: &Map<String, Value>) -> Option<RawRow> {
    let city = record.get("city")?.as_str()?.to_string();
    let field = |name: &str| record.get(name).cloned().unwrap_or(Value::Null);

    Some(RawRow {
        city,
        time: field("time"),
        pm10: field("pm10"),
        pm2_5: field("pm2_5"),
        carbon_monoxide: field("carbon_monoxide"),
        nitrogen_dioxide: field("nitrogen_dioxide"),
        sulphur_dioxide: field("sulphur_dioxide"),
        ozone: field("ozone"),
        uv_index: field("uv_index"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_parse_one_row_per_timestamp() {
        let payload = json!({
            "hourly": {
                "time": ["2024-01-01T00:00", "2024-01-01T01:00", "2024-01-01T02:00"],
                "pm2_5": [1.0, null, 3.0],
                "pm10": [4, 5, 6]
            }
        });

        let rows = parse_payload(&bytes(payload), "lagos").unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.city == "lagos"));
        assert_eq!(rows[1].time, json!("2024-01-01T01:00"));
        assert_eq!(rows[1].pm2_5, Value::Null);
        assert_eq!(rows[2].pm10, json!(6));
    }

    #[test]
    fn test_missing_columns_are_null_filled() {
        let payload = json!({"hourly": {"time": ["2024-01-01T00:00", "2024-01-01T01:00"]}});

        let rows = parse_payload(&bytes(payload), "oslo").unwrap();

        assert_eq!(rows.len(), 2);
        for row in rows {
            assert_eq!(row.uv_index, Value::Null);
            assert_eq!(row.ozone, Value::Null);
            assert_eq!(row.pm2_5, Value::Null);
        }
    }

    #[test]
    fn test_mismatched_columns_follow_time_length() {
        let payload = json!({
            "hourly": {
                "time": ["a", "b", "c"],
                "pm10": [1],
                "ozone": [1, 2, 3, 4, 5]
            }
        });

        let rows = parse_payload(&bytes(payload), "lima").unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].pm10, json!(1));
        assert_eq!(rows[2].pm10, Value::Null);
        assert_eq!(rows[2].ozone, json!(3));
    }

    #[test]
    fn test_scalar_column_is_repeated() {
        let payload = json!({
            "hourly": {
                "time": ["2024-01-01T00:00", "2024-01-01T01:00"],
                "pm2_5": [10, 20],
                "uv_index": 5
            }
        });

        let rows = parse_payload(&bytes(payload), "x").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].uv_index, json!(5));
        assert_eq!(rows[1].uv_index, json!(5));
        assert_eq!(rows[1].pm2_5, json!(20));
    }

    #[test]
    fn test_object_column_is_null_filled() {
        let payload = json!({
            "hourly": {
                "time": ["2024-01-01T00:00"],
                "pm10": [7],
                "ozone": {"unit": "ug/m3"}
            }
        });

        let rows = parse_payload(&bytes(payload), "x").unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ozone, Value::Null);
        assert_eq!(rows[0].pm10, json!(7));
    }

    #[test]
    fn test_empty_time_array_yields_no_rows() {
        let payload = json!({"hourly": {"time": [], "pm10": [1, 2]}});
        let rows = parse_payload(&bytes(payload), "quito").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_time_is_malformed() {
        let payload = json!({"hourly": {"pm10": [1, 2]}});
        let err = parse_payload(&bytes(payload), "rome").unwrap_err();
        assert!(matches!(err, EtlError::MalformedPayload { ref city, .. } if city == "rome"));
    }

    #[test]
    fn test_missing_hourly_is_malformed() {
        let err = parse_payload(&bytes(json!({"daily": {}})), "rome").unwrap_err();
        assert!(matches!(err, EtlError::MalformedPayload { .. }));
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = parse_payload(&bytes(json!([1, 2, 3])), "rome").unwrap_err();
        assert!(matches!(err, EtlError::MalformedPayload { .. }));

        let err = parse_payload(b"{not json", "rome").unwrap_err();
        assert!(matches!(err, EtlError::MalformedPayload { .. }));
    }

    #[test]
    fn test_record_to_raw_row() {
        let record = json!({
            "city": "paris",
            "time": "2024-01-01T00:00:00",
            "pm2_5": 12.5,
            "severity": 999.0
        });

        let row = record_to_raw_row(record.as_object().unwrap()).unwrap();

        assert_eq!(row.city, "paris");
        assert_eq!(row.pm2_5, json!(12.5));
        assert_eq!(row.ozone, Value::Null);

        let no_city = json!({"time": "2024-01-01T00:00:00"});
        assert!(record_to_raw_row(no_city.as_object().unwrap()).is_none());
    }
}
