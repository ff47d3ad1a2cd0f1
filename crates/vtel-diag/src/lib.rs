//! vtel-diag - Diagnostic messages for vehicle interfaces
//!
//! Typed diagnostic requests and responses, the required-field rule used to
//! reject malformed payloads, and an ordered binary wire format for moving
//! messages across a process or transport boundary.
//!
//! # Quick Start
//!
//! ```rust
//! use vtel_diag::{DiagnosticRequest, WireDecode, WireEncode};
//!
//! // Engine speed (mode 0x01, PID 0x0C) polled at 1 Hz
//! let mut request = DiagnosticRequest::with_pid(1, 0x7DF, 0x01, 0x0C);
//! request.set_frequency(Some(1.0)).unwrap();
//! request.set_name(Some("engine_speed".to_string()));
//!
//! let wire = request.to_wire();
//! let decoded = DiagnosticRequest::from_wire(&wire).unwrap();
//! assert_eq!(decoded, request);
//!
//! // Payloads without bus/id/mode are rejected before construction
//! assert!(DiagnosticRequest::from_json(r#"{"bus": 1, "id": 2015}"#).is_err());
//! ```

pub mod codec;
pub mod error;
pub mod fields;
pub mod message;
pub mod nrc;
pub mod request;
pub mod response;

pub use codec::{WireDecode, WireEncode, WireReader};
pub use error::{DiagnosticError, DiagnosticResult};
pub use fields::{contains_required_fields, REQUIRED_FIELDS};
pub use message::{parse_payload, DiagnosticMessage};
pub use nrc::NegativeResponseCode;
pub use request::DiagnosticRequest;
pub use response::DiagnosticResponse;

/// A parsed diagnostic payload of either direction
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    Request(DiagnosticRequest),
    Response(DiagnosticResponse),
}

/// Parse a JSON diagnostic payload without knowing its direction up front
///
/// Payloads carrying a `success` field are responses; everything else is
/// treated as a request. Either way the required fields are checked first.
pub fn parse_diagnostic(json: &str) -> DiagnosticResult<Diagnostic> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let is_response = value
        .as_object()
        .is_some_and(|object| object.contains_key(fields::SUCCESS_KEY));

    if is_response {
        DiagnosticResponse::from_json(json).map(Diagnostic::Response)
    } else {
        DiagnosticRequest::from_json(json).map(Diagnostic::Request)
    }
}
