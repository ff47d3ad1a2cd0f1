//! Trace records - recorded measurement streams
//!
//! A trace is a JSON-lines file with one record per line:
//!
//! ```text
//! {"timestamp": 1351176963.426318, "name": "vehicle_speed", "value": 42.1}
//! {"timestamp": 1351176963.438087, "name": "door_status", "value": "driver", "event": true}
//! ```
//!
//! `timestamp` (seconds since the Unix epoch) and `event` are optional.

use std::io::BufRead;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TelemetryError, TelemetryResult};
use crate::measurement::{Measurement, MeasurementValue};

/// One line of a trace file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub name: String,
    pub value: MeasurementValue,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub event: Option<MeasurementValue>,
    /// Seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<f64>,
}

impl TraceRecord {
    /// Parse a single line; blank lines yield `None`
    ///
    /// `line_no` is 1-based and only used for error reporting.
    pub fn parse_line(line: &str, line_no: usize) -> TelemetryResult<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let record: Self =
            serde_json::from_str(line).map_err(|e| TelemetryError::InvalidTrace {
                line: line_no,
                reason: e.to_string(),
            })?;

        if record.name.is_empty() {
            return Err(TelemetryError::InvalidTrace {
                line: line_no,
                reason: "empty measurement name".to_string(),
            });
        }

        Ok(Some(record))
    }

    /// Recorded time, if the line carried one
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        let ts = self.timestamp?;
        if !ts.is_finite() {
            return None;
        }
        DateTime::from_timestamp_millis((ts * 1000.0).round() as i64)
    }

    /// Build the measurement this record describes
    ///
    /// Uses the recorded timestamp when present, the current time otherwise.
    pub fn to_measurement(&self) -> Measurement {
        let measurement = Measurement::from_parts(self.value.clone(), self.event.clone());
        match self.recorded_at() {
            Some(at) => measurement.with_timestamp(at),
            None => measurement,
        }
    }
}

/// Parse an entire trace
///
/// Stops at the first malformed line.
pub fn parse_trace(reader: impl BufRead) -> TelemetryResult<Vec<TraceRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(record) = TraceRecord::parse_line(&line, idx + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    const TRACE: &str = r#"
{"timestamp": 1351176963.426, "name": "vehicle_speed", "value": 42.1}

{"timestamp": 1351176963.438, "name": "door_status", "value": "driver", "event": true}
{"name": "parking_brake_status", "value": false}
"#;

    #[test]
    fn test_parse_trace_skips_blank_lines() {
        let records = parse_trace(Cursor::new(TRACE)).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "vehicle_speed");
        assert_eq!(records[0].value, MeasurementValue::Number(42.1));
        assert_eq!(records[1].event, Some(MeasurementValue::Bool(true)));
        assert_eq!(records[2].timestamp, None);
    }

    #[test]
    fn test_recorded_timestamp_is_kept() {
        let records = parse_trace(Cursor::new(TRACE)).unwrap();
        let m = records[0].to_measurement();
        assert_eq!(
            m.timestamp().map(|t| t.timestamp_millis()),
            Some(1_351_176_963_426)
        );
        assert_eq!(m.number(), Some(42.1));
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let trace = "{\"name\": \"a\", \"value\": 1}\n{not json}\n";
        let err = parse_trace(Cursor::new(trace)).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidTrace { line: 2, .. }));
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let err = TraceRecord::parse_line(r#"{"name": "vehicle_speed"}"#, 4).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidTrace { line: 4, .. }));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = TraceRecord::parse_line(r#"{"name": "", "value": 1}"#, 1).unwrap_err();
        assert!(err.to_string().contains("empty measurement name"));
    }
}
