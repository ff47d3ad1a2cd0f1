//! Negative response codes carried by failed diagnostic responses

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Reason an ECU rejected a diagnostic request
///
/// Serialized as the raw code byte, so JSON carries `"negative_response_code": 18`.
/// Codes compare by that byte, so `Other(0x10)` equals `GeneralReject`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum NegativeResponseCode {
    GeneralReject,
    ServiceNotSupported,
    SubFunctionNotSupported,
    IncorrectMessageLengthOrFormat,
    ResponseTooLong,
    BusyRepeatRequest,
    ConditionsNotCorrect,
    RequestSequenceError,
    NoResponseFromSubnet,
    RequestOutOfRange,
    SecurityAccessDenied,
    InvalidKey,
    ExceededNumberOfAttempts,
    RequiredTimeDelayNotExpired,
    ResponsePending,
    SubFunctionNotSupportedInActiveSession,
    ServiceNotSupportedInActiveSession,
    /// Anything outside the table above, kept verbatim
    Other(u8),
}

impl NegativeResponseCode {
    /// The raw code byte
    pub fn code(&self) -> u8 {
        u8::from(*self)
    }

    /// Same code, with `Other` resolved to a named variant where one exists
    pub fn normalized(&self) -> Self {
        Self::from(self.code())
    }

    /// Short human-readable explanation
    pub fn description(&self) -> &'static str {
        match self.normalized() {
            Self::GeneralReject => "general reject",
            Self::ServiceNotSupported => "service not supported",
            Self::SubFunctionNotSupported => "sub-function not supported",
            Self::IncorrectMessageLengthOrFormat => "incorrect message length or format",
            Self::ResponseTooLong => "response too long",
            Self::BusyRepeatRequest => "busy, repeat request",
            Self::ConditionsNotCorrect => "conditions not correct",
            Self::RequestSequenceError => "request sequence error",
            Self::NoResponseFromSubnet => "no response from subnet component",
            Self::RequestOutOfRange => "request out of range",
            Self::SecurityAccessDenied => "security access denied",
            Self::InvalidKey => "invalid key",
            Self::ExceededNumberOfAttempts => "exceeded number of attempts",
            Self::RequiredTimeDelayNotExpired => "required time delay not expired",
            Self::ResponsePending => "request received, response pending",
            Self::SubFunctionNotSupportedInActiveSession => {
                "sub-function not supported in active session"
            }
            Self::ServiceNotSupportedInActiveSession => "service not supported in active session",
            Self::Other(_) => "unknown negative response",
        }
    }

    /// The ECU is still working; the request should not be treated as failed
    pub fn is_pending(&self) -> bool {
        matches!(
            self.normalized(),
            Self::ResponsePending | Self::BusyRepeatRequest
        )
    }
}

impl PartialEq for NegativeResponseCode {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for NegativeResponseCode {}

impl Hash for NegativeResponseCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

impl From<u8> for NegativeResponseCode {
    fn from(code: u8) -> Self {
        match code {
            0x10 => Self::GeneralReject,
            0x11 => Self::ServiceNotSupported,
            0x12 => Self::SubFunctionNotSupported,
            0x13 => Self::IncorrectMessageLengthOrFormat,
            0x14 => Self::ResponseTooLong,
            0x21 => Self::BusyRepeatRequest,
            0x22 => Self::ConditionsNotCorrect,
            0x24 => Self::RequestSequenceError,
            0x25 => Self::NoResponseFromSubnet,
            0x31 => Self::RequestOutOfRange,
            0x33 => Self::SecurityAccessDenied,
            0x35 => Self::InvalidKey,
            0x36 => Self::ExceededNumberOfAttempts,
            0x37 => Self::RequiredTimeDelayNotExpired,
            0x78 => Self::ResponsePending,
            0x7E => Self::SubFunctionNotSupportedInActiveSession,
            0x7F => Self::ServiceNotSupportedInActiveSession,
            other => Self::Other(other),
        }
    }
}

impl From<NegativeResponseCode> for u8 {
    fn from(nrc: NegativeResponseCode) -> Self {
        match nrc {
            NegativeResponseCode::GeneralReject => 0x10,
            NegativeResponseCode::ServiceNotSupported => 0x11,
            NegativeResponseCode::SubFunctionNotSupported => 0x12,
            NegativeResponseCode::IncorrectMessageLengthOrFormat => 0x13,
            NegativeResponseCode::ResponseTooLong => 0x14,
            NegativeResponseCode::BusyRepeatRequest => 0x21,
            NegativeResponseCode::ConditionsNotCorrect => 0x22,
            NegativeResponseCode::RequestSequenceError => 0x24,
            NegativeResponseCode::NoResponseFromSubnet => 0x25,
            NegativeResponseCode::RequestOutOfRange => 0x31,
            NegativeResponseCode::SecurityAccessDenied => 0x33,
            NegativeResponseCode::InvalidKey => 0x35,
            NegativeResponseCode::ExceededNumberOfAttempts => 0x36,
            NegativeResponseCode::RequiredTimeDelayNotExpired => 0x37,
            NegativeResponseCode::ResponsePending => 0x78,
            NegativeResponseCode::SubFunctionNotSupportedInActiveSession => 0x7E,
            NegativeResponseCode::ServiceNotSupportedInActiveSession => 0x7F,
            NegativeResponseCode::Other(code) => code,
        }
    }
}

impl fmt::Display for NegativeResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X} ({})", self.code(), self.description())
    }
}
