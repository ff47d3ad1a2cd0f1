//! Error types for telemetry ingestion

use thiserror::Error;

/// Errors raised while turning external input into measurements.
///
/// Store and sink operations themselves never fail; these only surface from
/// the trace reader and other producers built on top of this crate.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A trace line could not be turned into a record
    #[error("invalid trace record at line {line}: {reason}")]
    InvalidTrace { line: usize, reason: String },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for telemetry operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;
