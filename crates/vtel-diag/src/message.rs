//! Diagnostic message base
//!
//! Every diagnostic request and response is addressed by the same triple:
//! CAN bus, arbitration id and service mode. The parameter id and payload are
//! optional and depend on the mode. A message may also carry the time it was
//! sent or received and a map of vendor-specific extras.

use std::fmt;

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::codec::{WireBufExt, WireDecode, WireEncode, WireReader};
use crate::error::{DiagnosticError, DiagnosticResult};
use crate::fields::{missing_fields, REQUIRED_FIELDS};

/// Fields shared by diagnostic requests and responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    bus: u8,
    id: u32,
    mode: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pid: Option<u16>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        with = "payload_hex"
    )]
    payload: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    extras: Option<Map<String, Value>>,
}

impl DiagnosticMessage {
    pub fn new(bus: u8, id: u32, mode: u8) -> Self {
        Self {
            bus,
            id,
            mode,
            pid: None,
            payload: None,
            timestamp: None,
            extras: None,
        }
    }

    /// Set the parameter id
    pub fn with_pid(mut self, pid: u16) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Set the raw payload bytes
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Attach vendor-specific fields
    pub fn with_extras(mut self, extras: Map<String, Value>) -> Self {
        self.extras = Some(extras);
        self
    }

    pub fn bus(&self) -> u8 {
        self.bus
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn mode(&self) -> u8 {
        self.mode
    }

    pub fn pid(&self) -> Option<u16> {
        self.pid
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn extras(&self) -> Option<&Map<String, Value>> {
        self.extras.as_ref()
    }

    pub fn set_pid(&mut self, pid: Option<u16>) {
        self.pid = pid;
    }

    pub fn set_payload(&mut self, payload: Option<Vec<u8>>) {
        self.payload = payload;
    }

    pub fn set_timestamp(&mut self, timestamp: Option<DateTime<Utc>>) {
        self.timestamp = timestamp;
    }

    pub fn set_extras(&mut self, extras: Option<Map<String, Value>>) {
        self.extras = extras;
    }

    /// Parse from JSON, rejecting payloads without bus/id/mode
    pub fn from_json(json: &str) -> DiagnosticResult<Self> {
        parse_checked(json, &REQUIRED_FIELDS)
    }

    pub fn to_json(&self) -> DiagnosticResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write the base fields as `key=value` pairs
    pub(crate) fn fmt_fields(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.timestamp {
            Some(ts) => write!(f, "timestamp={}, ", ts.to_rfc3339())?,
            None => write!(f, "timestamp=None, ")?,
        }
        write!(f, "bus={}, id=0x{:X}, mode=0x{:02X}", self.bus, self.id, self.mode)?;
        match self.pid {
            Some(pid) => write!(f, ", pid=0x{:X}", pid)?,
            None => write!(f, ", pid=None")?,
        }
        match &self.payload {
            Some(payload) => write!(f, ", payload=0x{}", hex::encode(payload))?,
            None => write!(f, ", payload=None")?,
        }
        Ok(())
    }

    /// Write the extras map, last in every textual form
    pub(crate) fn fmt_extras(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.extras {
            Some(extras) => {
                let json = serde_json::to_string(extras).map_err(|_| fmt::Error)?;
                write!(f, ", extras={}", json)
            }
            None => write!(f, ", extras=None"),
        }
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiagnosticMessage{{")?;
        self.fmt_fields(f)?;
        self.fmt_extras(f)?;
        write!(f, "}}")
    }
}

impl WireEncode for DiagnosticMessage {
    fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_u8(self.bus);
        buf.put_u32(self.id);
        buf.put_u8(self.mode);
        buf.put_opt_u16(self.pid);
        buf.put_opt_bytes(self.payload.as_deref());
        buf.put_opt_timestamp(self.timestamp.as_ref());
        let extras = self.extras.as_ref().map(|m| Value::Object(m.clone()).to_string());
        buf.put_opt_str(extras.as_deref());
    }
}

impl WireDecode for DiagnosticMessage {
    fn decode_from(reader: &mut WireReader<'_>) -> DiagnosticResult<Self> {
        Ok(Self {
            bus: reader.u8()?,
            id: reader.u32()?,
            mode: reader.u8()?,
            pid: reader.optional(|r| r.u16())?,
            payload: reader.optional(|r| r.bytes())?,
            timestamp: reader.optional(|r| r.timestamp())?,
            extras: reader
                .optional(|r| r.string())?
                .map(|json| serde_json::from_str(&json))
                .transpose()?,
        })
    }
}

/// Parse a hex payload string, with or without a `0x` prefix
pub fn parse_payload(s: &str) -> DiagnosticResult<Vec<u8>> {
    let digits = s.trim().trim_start_matches("0x").trim_start_matches("0X");
    hex::decode(digits).map_err(|e| DiagnosticError::InvalidPayload(format!("{}: {}", s, e)))
}

/// Deserialize `json` as `T` after checking that its keys cover `required`
pub(crate) fn parse_checked<T: DeserializeOwned>(
    json: &str,
    required: &[&str],
) -> DiagnosticResult<T> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let missing = match value.as_object() {
        Some(object) => missing_fields(object.keys(), required),
        None => required.iter().map(|s| s.to_string()).collect(),
    };
    if !missing.is_empty() {
        debug!(?missing, "Rejecting diagnostic payload");
        return Err(DiagnosticError::UnrecognizedMessage { missing });
    }
    Ok(serde_json::from_value(value)?)
}

/// Serde adapter: `Option<Vec<u8>>` as a `0x`-prefixed hex string
mod payload_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        payload: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match payload {
            Some(bytes) => serializer.serialize_str(&format!("0x{}", hex::encode(bytes))),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| super::parse_payload(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
