//! Diagnostic requests
//!
//! A request asks one ECU (or all of them, on a broadcast id) for a value.
//! With a `frequency` it becomes a recurring poll; with `multiple_responses`
//! the vehicle interface keeps collecting answers after the first one.

use std::fmt;

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::{WireBufExt, WireDecode, WireEncode, WireReader};
use crate::error::{DiagnosticError, DiagnosticResult};
use crate::fields::REQUIRED_FIELDS;
use crate::message::{parse_checked, DiagnosticMessage};

/// An outbound diagnostic query
///
/// Equality ignores `frequency`: polling rates arrive as floats from several
/// sources and are not compared exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticRequest {
    #[serde(flatten)]
    message: DiagnosticMessage,
    #[serde(default)]
    multiple_responses: bool,
    /// Polling rate in Hz; `None` for a one-shot request. Always finite.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    frequency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    name: Option<String>,
}

impl DiagnosticRequest {
    pub fn new(bus: u8, id: u32, mode: u8) -> Self {
        Self::from_message(DiagnosticMessage::new(bus, id, mode))
    }

    pub fn with_pid(bus: u8, id: u32, mode: u8, pid: u16) -> Self {
        Self::from_message(DiagnosticMessage::new(bus, id, mode).with_pid(pid))
    }

    pub fn from_message(message: DiagnosticMessage) -> Self {
        Self {
            message,
            multiple_responses: false,
            frequency: None,
            name: None,
        }
    }

    /// Parse from JSON; payloads without bus/id/mode are unrecognized
    pub fn from_json(json: &str) -> DiagnosticResult<Self> {
        parse_checked(json, &REQUIRED_FIELDS)
    }

    pub fn to_json(&self) -> DiagnosticResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn message(&self) -> &DiagnosticMessage {
        &self.message
    }

    pub fn bus(&self) -> u8 {
        self.message.bus()
    }

    pub fn id(&self) -> u32 {
        self.message.id()
    }

    pub fn mode(&self) -> u8 {
        self.message.mode()
    }

    pub fn pid(&self) -> Option<u16> {
        self.message.pid()
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.message.payload()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.message.timestamp()
    }

    pub fn extras(&self) -> Option<&Map<String, Value>> {
        self.message.extras()
    }

    pub fn multiple_responses(&self) -> bool {
        self.multiple_responses
    }

    pub fn frequency(&self) -> Option<f64> {
        self.frequency
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// True when the request should be repeated at `frequency`
    pub fn is_recurring(&self) -> bool {
        self.frequency.is_some_and(|hz| hz > 0.0)
    }

    pub fn set_pid(&mut self, pid: Option<u16>) {
        self.message.set_pid(pid);
    }

    pub fn set_payload(&mut self, payload: Option<Vec<u8>>) {
        self.message.set_payload(payload);
    }

    pub fn set_timestamp(&mut self, timestamp: Option<DateTime<Utc>>) {
        self.message.set_timestamp(timestamp);
    }

    pub fn set_extras(&mut self, extras: Option<Map<String, Value>>) {
        self.message.set_extras(extras);
    }

    pub fn set_multiple_responses(&mut self, multiple_responses: bool) {
        self.multiple_responses = multiple_responses;
    }

    /// Set the polling rate; NaN and infinite rates are rejected
    pub fn set_frequency(&mut self, frequency: Option<f64>) -> DiagnosticResult<()> {
        self.frequency = check_frequency(frequency)?;
        Ok(())
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }
}

fn check_frequency(frequency: Option<f64>) -> DiagnosticResult<Option<f64>> {
    match frequency {
        Some(hz) if !hz.is_finite() => Err(DiagnosticError::InvalidFrequency(hz)),
        other => Ok(other),
    }
}

impl PartialEq for DiagnosticRequest {
    fn eq(&self, other: &Self) -> bool {
        // frequency deliberately not compared
        self.message == other.message
            && self.multiple_responses == other.multiple_responses
            && self.name == other.name
    }
}

impl fmt::Display for DiagnosticRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiagnosticRequest{{")?;
        self.message.fmt_fields(f)?;
        write!(f, ", multiple_responses={}", self.multiple_responses)?;
        match self.frequency {
            Some(hz) => write!(f, ", frequency={}", hz)?,
            None => write!(f, ", frequency=None")?,
        }
        match &self.name {
            Some(name) => write!(f, ", name={}", name)?,
            None => write!(f, ", name=None")?,
        }
        self.message.fmt_extras(f)?;
        write!(f, "}}")
    }
}

impl WireEncode for DiagnosticRequest {
    fn encode_to(&self, buf: &mut BytesMut) {
        self.message.encode_to(buf);
        buf.put_u8(u8::from(self.multiple_responses));
        buf.put_opt_f64(self.frequency);
        buf.put_opt_str(self.name.as_deref());
    }
}

impl WireDecode for DiagnosticRequest {
    fn decode_from(reader: &mut WireReader<'_>) -> DiagnosticResult<Self> {
        Ok(Self {
            message: DiagnosticMessage::decode_from(reader)?,
            multiple_responses: reader.flag()?,
            frequency: check_frequency(reader.optional(|r| r.f64())?)?,
            name: reader.optional(|r| r.string())?,
        })
    }
}
