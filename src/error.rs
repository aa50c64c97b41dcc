//! Engine error taxonomy.
//!
//! Every fallible operation in this crate raises an [`EngineError`]. The
//! variants are the stable error kinds the HTTP boundary maps to status
//! codes; this crate never formats responses itself.

use thiserror::Error;

/// Errors raised by the telemetry engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The wire payload could not be decoded.
    #[error("malformed payload: {0}")]
    Decode(String),

    /// The payload was oversized or failed decompression.
    #[error("payload rejected: {0}")]
    Payload(String),

    /// A pagination cursor could not be parsed.
    #[error("invalid cursor: {0}")]
    Cursor(String),

    /// An entity failed validation at the ingest boundary.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A stored row violated the expected shape.
    ///
    /// This indicates schema drift or a write-path defect, not a caller
    /// mistake. The row context is logged where the error is raised; the
    /// message stays generic so internals never leak to callers.
    #[error("stored row could not be decoded: {0}")]
    StorageRowParse(String),

    /// Unknown signal, unknown metric kind, or missing call context.
    ///
    /// Fatal for the request that triggered it.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The storage engine reported a transport or execution failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// The caller cancelled an in-flight storage operation.
    #[error("operation cancelled")]
    Cancelled,
}

impl EngineError {
    /// Returns true if this error indicates a defect rather than bad input.
    #[must_use]
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::StorageRowParse(_) | Self::Configuration(_))
    }
}

impl From<clickhouse::error::Error> for EngineError {
    fn from(err: clickhouse::error::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            EngineError::Cursor("missing tiebreaker".to_string()).to_string(),
            "invalid cursor: missing tiebreaker"
        );
        assert_eq!(EngineError::Cancelled.to_string(), "operation cancelled");
    }

    #[test]
    fn test_defect_classification() {
        assert!(EngineError::StorageRowParse("bad row".into()).is_defect());
        assert!(EngineError::Configuration("unknown kind".into()).is_defect());
        assert!(!EngineError::Decode("truncated".into()).is_defect());
        assert!(!EngineError::Cancelled.is_defect());
    }
}
