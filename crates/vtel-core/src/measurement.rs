//! Measurement models
//!
//! Signals from the vehicle interface carry numbers, strings or booleans, and
//! some carry a second "event" value (e.g. a door name alongside its state).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single signal value
///
/// Serialized untagged, so JSON `42.5`, `"drive"` and `true` map directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl MeasurementValue {
    /// Numeric payload, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String payload, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean payload, if this is a flag
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short type label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<f64> for MeasurementValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for MeasurementValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for MeasurementValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for MeasurementValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for MeasurementValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MeasurementValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// The latest known state of one named signal
///
/// A measurement with neither value nor event is the canonical "unknown"
/// state, which is distinct from a measurement carrying `false` or `0`.
/// Measurements are immutable once built; the builder methods consume `self`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    value: Option<MeasurementValue>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    event: Option<MeasurementValue>,
    /// When the value was received (or recorded, for replayed traces)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    timestamp: Option<DateTime<Utc>>,
}

impl Measurement {
    /// Create a measurement stamped with the current time
    pub fn new(value: impl Into<MeasurementValue>) -> Self {
        Self {
            value: Some(value.into()),
            event: None,
            timestamp: Some(Utc::now()),
        }
    }

    /// Build from the raw parts a producer hands to a sink
    pub fn from_parts(value: MeasurementValue, event: Option<MeasurementValue>) -> Self {
        Self {
            value: Some(value),
            event,
            timestamp: Some(Utc::now()),
        }
    }

    /// The canonical absent measurement
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Attach an event value
    pub fn with_event(mut self, event: impl Into<MeasurementValue>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Replace the timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn value(&self) -> Option<&MeasurementValue> {
        self.value.as_ref()
    }

    pub fn event(&self) -> Option<&MeasurementValue> {
        self.event.as_ref()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// True when both value and event are absent
    pub fn is_unknown(&self) -> bool {
        self.value.is_none() && self.event.is_none()
    }

    pub fn has_event(&self) -> bool {
        self.event.is_some()
    }

    /// Shortcut for numeric signals
    pub fn number(&self) -> Option<f64> {
        self.value.as_ref().and_then(MeasurementValue::as_number)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, &self.event) {
            (None, None) => write!(f, "unknown"),
            (None, Some(event)) => write!(f, "none ({})", event),
            (Some(value), None) => write!(f, "{}", value),
            (Some(value), Some(event)) => write!(f, "{} ({})", value, event),
        }
    }
}
