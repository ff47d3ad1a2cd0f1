//! Error types for diagnostic messages

use thiserror::Error;

/// Errors that can occur while parsing or decoding diagnostic messages
#[derive(Debug, Error)]
pub enum DiagnosticError {
    /// Payload lacks the fields that identify a diagnostic message
    #[error("unrecognized message: missing required fields {missing:?}")]
    UnrecognizedMessage { missing: Vec<String> },

    /// Wire data ended before a field was complete
    #[error("truncated message: needed {needed} more bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// Presence/boolean byte other than 0x00 or 0x01
    #[error("invalid flag byte: 0x{0:02X}")]
    InvalidFlag(u8),

    /// Name field is not valid UTF-8
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// Extra bytes after a complete message
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    /// Payload hex string could not be decoded
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Timestamp outside the range chrono can represent
    #[error("invalid timestamp: {secs}s + {nanos}ns")]
    InvalidTimestamp { secs: i64, nanos: u32 },

    /// Polling frequency that is NaN or infinite
    #[error("invalid frequency: {0}")]
    InvalidFrequency(f64),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for diagnostic message operations
pub type DiagnosticResult<T> = Result<T, DiagnosticError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_lists_missing_fields() {
        let err = DiagnosticError::UnrecognizedMessage {
            missing: vec!["mode".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unrecognized message: missing required fields [\"mode\"]"
        );
    }

    #[test]
    fn test_invalid_flag_is_hex() {
        assert_eq!(
            DiagnosticError::InvalidFlag(0x7F).to_string(),
            "invalid flag byte: 0x7F"
        );
    }

    #[test]
    fn test_invalid_frequency_message() {
        assert_eq!(
            DiagnosticError::InvalidFrequency(f64::INFINITY).to_string(),
            "invalid frequency: inf"
        );
    }
}
