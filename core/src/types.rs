//! The earthquake record and the GeoJSON shapes it is read from.
//!
//! # Design
//! `Record` can only be built complete: all three fields are required by
//! `Record::new` and there are no setters. The wire DTOs cover only the
//! subset of the USGS GeoJSON the client reads; unknown fields are ignored.
//! Scalar properties are coerced the way loosely typed JSON readers do:
//! numbers may arrive as floats or numeric strings, titles as any scalar.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One earthquake event as displayed by the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    title: String,
    occurred_at_millis: i64,
    alert_level: i32,
}

impl Record {
    pub fn new(title: impl Into<String>, occurred_at_millis: i64, alert_level: i32) -> Self {
        Self {
            title: title.into(),
            occurred_at_millis,
            alert_level,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Event time in milliseconds since the Unix epoch.
    pub fn occurred_at_millis(&self) -> i64 {
        self.occurred_at_millis
    }

    /// Raw tsunami flag as sent by the feed.
    pub fn alert_level(&self) -> i32 {
        self.alert_level
    }

    pub fn alert(&self) -> TsunamiAlert {
        TsunamiAlert::from_code(self.alert_level)
    }
}

/// Interpretation of the feed's `tsunami` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsunamiAlert {
    None,
    Issued,
    Unknown(i32),
}

impl TsunamiAlert {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => TsunamiAlert::None,
            1 => TsunamiAlert::Issued,
            other => TsunamiAlert::Unknown(other),
        }
    }
}

/// Top level of the FDSN GeoJSON response. Features stay undecoded so a
/// malformed later entry cannot spoil the first one.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub properties: Properties,
}

#[derive(Debug, Deserialize)]
pub struct Properties {
    #[serde(deserialize_with = "scalar_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub time: i64,
    #[serde(deserialize_with = "lenient_i32")]
    pub tsunami: i32,
}

/// Integer, float (truncated toward zero) or numeric string.
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    coerce_i64(&value).ok_or_else(|| de::Error::custom(format!("expected a number, got {value}")))
}

fn lenient_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    coerce_i64(&value)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| de::Error::custom(format!("expected a 32-bit integer, got {value}")))
}

/// Strings pass through; numbers and booleans are rendered. Null, arrays
/// and objects are rejected.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!("expected a string, got {other}"))),
    }
}

impl From<Properties> for Record {
    fn from(p: Properties) -> Self {
        Record::new(p.title, p.time, p.tsunami)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_code_mapping() {
        assert_eq!(TsunamiAlert::from_code(0), TsunamiAlert::None);
        assert_eq!(TsunamiAlert::from_code(1), TsunamiAlert::Issued);
        assert_eq!(TsunamiAlert::from_code(2), TsunamiAlert::Unknown(2));
        assert_eq!(TsunamiAlert::from_code(-1), TsunamiAlert::Unknown(-1));
    }

    #[test]
    fn record_from_properties_keeps_values() {
        let props: Properties = serde_json::from_str(
            r#"{"mag":8.6,"title":"M 8.6 - off the west coast of northern Sumatra","time":1334132708820,"tsunami":1}"#,
        )
        .unwrap();
        let record = Record::from(props);
        assert_eq!(record.title(), "M 8.6 - off the west coast of northern Sumatra");
        assert_eq!(record.occurred_at_millis(), 1334132708820);
        assert_eq!(record.alert(), TsunamiAlert::Issued);
    }

    #[test]
    fn properties_reject_missing_title() {
        let result: Result<Properties, _> =
            serde_json::from_str(r#"{"time":1334132708820,"tsunami":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn properties_reject_non_numeric_time() {
        let result: Result<Properties, _> =
            serde_json::from_str(r#"{"title":"x","time":"soon","tsunami":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn properties_coerce_numeric_forms() {
        let props: Properties = serde_json::from_str(
            r#"{"title":8.6,"time":1328970776270.0,"tsunami":"1"}"#,
        )
        .unwrap();
        assert_eq!(props.title, "8.6");
        assert_eq!(props.time, 1328970776270);
        assert_eq!(props.tsunami, 1);
    }

    #[test]
    fn properties_coerce_float_and_string_numbers() {
        let props: Properties = serde_json::from_str(
            r#"{"title":"t","time":" 1328970776270 ","tsunami":1.0}"#,
        )
        .unwrap();
        assert_eq!(props.time, 1328970776270);
        assert_eq!(props.tsunami, 1);
    }

    #[test]
    fn properties_reject_null_title_and_oversized_alert() {
        let null_title: Result<Properties, _> =
            serde_json::from_str(r#"{"title":null,"time":1,"tsunami":0}"#);
        assert!(null_title.is_err());

        let huge: Result<Properties, _> =
            serde_json::from_str(r#"{"title":"t","time":1,"tsunami":4294967296}"#);
        assert!(huge.is_err());
    }
}
