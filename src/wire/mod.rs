//! Wire protocol support.
//!
//! [`SignalKind`] and [`WireFormat`] tag every payload moving through the
//! ingestion normalizer; [`proto`] holds the OTLP protobuf message set.
//! The HTTP layer resolves a request's endpoint and `content-type` into
//! these tags before calling into [`crate::ingest`].

pub mod proto;

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Content type for protobuf payloads.
pub const CONTENT_TYPE_PROTOBUF: &str = "application/x-protobuf";
/// Content type for JSON payloads.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// One of the three telemetry signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Distributed trace spans.
    Traces,
    /// Log records.
    Logs,
    /// Metric data points.
    Metrics,
}

impl SignalKind {
    /// Resolves an endpoint path (`/v1/traces` etc.) to a signal.
    ///
    /// # Errors
    ///
    /// Returns a [`EngineError::Configuration`] error for unknown paths -
    /// an unrecognized endpoint is fatal for the request.
    pub fn from_endpoint(path: &str) -> Result<Self, EngineError> {
        match path {
            "/v1/traces" => Ok(Self::Traces),
            "/v1/logs" => Ok(Self::Logs),
            "/v1/metrics" => Ok(Self::Metrics),
            other => Err(EngineError::Configuration(format!(
                "unknown signal endpoint: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Traces => write!(f, "traces"),
            Self::Logs => write!(f, "logs"),
            Self::Metrics => write!(f, "metrics"),
        }
    }
}

/// The encoding of a wire payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Compact binary (protobuf).
    Protobuf,
    /// Structured text (JSON).
    Json,
}

impl WireFormat {
    /// Resolves a `content-type` header value to a wire format.
    ///
    /// # Errors
    ///
    /// Returns a [`EngineError::Decode`] error for unsupported types.
    pub fn from_content_type(content_type: &str) -> Result<Self, EngineError> {
        let base = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match base.as_str() {
            CONTENT_TYPE_PROTOBUF => Ok(Self::Protobuf),
            CONTENT_TYPE_JSON => Ok(Self::Json),
            other => Err(EngineError::Decode(format!(
                "unsupported content type: {other}"
            ))),
        }
    }

    /// The `content-type` a response in this format must carry: responses
    /// echo the request's encoding.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Protobuf => CONTENT_TYPE_PROTOBUF,
            Self::Json => CONTENT_TYPE_JSON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_resolution() {
        assert_eq!(
            SignalKind::from_endpoint("/v1/traces").unwrap(),
            SignalKind::Traces
        );
        assert_eq!(
            SignalKind::from_endpoint("/v1/logs").unwrap(),
            SignalKind::Logs
        );
        assert_eq!(
            SignalKind::from_endpoint("/v1/metrics").unwrap(),
            SignalKind::Metrics
        );
        assert!(matches!(
            SignalKind::from_endpoint("/v1/profiles"),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_content_type_resolution() {
        assert_eq!(
            WireFormat::from_content_type("application/x-protobuf").unwrap(),
            WireFormat::Protobuf
        );
        assert_eq!(
            WireFormat::from_content_type("application/json; charset=utf-8").unwrap(),
            WireFormat::Json
        );
        assert!(WireFormat::from_content_type("text/plain").is_err());
    }

    #[test]
    fn test_response_content_type_echoes_format() {
        assert_eq!(
            WireFormat::Protobuf.content_type(),
            "application/x-protobuf"
        );
        assert_eq!(WireFormat::Json.content_type(), "application/json");
    }
}
