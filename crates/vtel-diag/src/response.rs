//! Diagnostic responses

use std::fmt;

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{WireBufExt, WireDecode, WireEncode, WireReader};
use crate::error::DiagnosticResult;
use crate::fields::RESPONSE_REQUIRED_FIELDS;
use crate::message::{parse_checked, DiagnosticMessage};
use crate::nrc::NegativeResponseCode;

/// An inbound answer to a [`DiagnosticRequest`](crate::DiagnosticRequest)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResponse {
    #[serde(flatten)]
    message: DiagnosticMessage,
    success: bool,
    /// Decoded value, when the vehicle interface knows how to interpret it
    #[serde(skip_serializing_if = "Option::is_none", default)]
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    negative_response_code: Option<NegativeResponseCode>,
}

impl DiagnosticResponse {
    /// A positive response
    pub fn positive(message: DiagnosticMessage) -> Self {
        Self {
            message,
            success: true,
            value: None,
            negative_response_code: None,
        }
    }

    /// A negative response carrying the ECU's reason
    pub fn negative(message: DiagnosticMessage, nrc: NegativeResponseCode) -> Self {
        Self {
            message,
            success: false,
            value: None,
            negative_response_code: Some(nrc),
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Parse from JSON; bus/id/mode/success are required
    pub fn from_json(json: &str) -> DiagnosticResult<Self> {
        parse_checked(json, &RESPONSE_REQUIRED_FIELDS)
    }

    pub fn to_json(&self) -> DiagnosticResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn message(&self) -> &DiagnosticMessage {
        &self.message
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn negative_response_code(&self) -> Option<NegativeResponseCode> {
        self.negative_response_code
    }

    /// Whether this response answers `request` (same bus, id, mode and pid)
    ///
    /// Responses from a functional broadcast come back on the physical
    /// response id, i.e. request id + 8.
    pub fn answers(&self, request: &crate::DiagnosticRequest) -> bool {
        let id_matches = self.message.id() == request.id()
            || self.message.id() == request.id().wrapping_add(8)
            || request.id() == FUNCTIONAL_BROADCAST_ID;
        self.message.bus() == request.bus()
            && id_matches
            && self.message.mode() == request.mode()
            && self.message.pid() == request.pid()
    }
}

/// OBD-II functional broadcast arbitration id
pub const FUNCTIONAL_BROADCAST_ID: u32 = 0x7DF;

impl fmt::Display for DiagnosticResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiagnosticResponse{{")?;
        self.message.fmt_fields(f)?;
        write!(f, ", success={}", self.success)?;
        match self.value {
            Some(v) => write!(f, ", value={}", v)?,
            None => write!(f, ", value=None")?,
        }
        match self.negative_response_code {
            Some(nrc) => write!(f, ", negative_response_code={}", nrc)?,
            None => write!(f, ", negative_response_code=None")?,
        }
        self.message.fmt_extras(f)?;
        write!(f, "}}")
    }
}

impl WireEncode for DiagnosticResponse {
    fn encode_to(&self, buf: &mut BytesMut) {
        self.message.encode_to(buf);
        buf.put_u8(u8::from(self.success));
        buf.put_opt_f64(self.value);
        buf.put_opt_u8(self.negative_response_code.map(u8::from));
    }
}

impl WireDecode for DiagnosticResponse {
    fn decode_from(reader: &mut WireReader<'_>) -> DiagnosticResult<Self> {
        Ok(Self {
            message: DiagnosticMessage::decode_from(reader)?,
            success: reader.flag()?,
            value: reader.optional(|r| r.f64())?,
            negative_response_code: reader.optional(|r| r.u8())?.map(NegativeResponseCode::from),
        })
    }
}
