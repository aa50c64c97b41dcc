//! Trace and span data models.
//!
//! Canonical span entities as produced by the ingestion normalizer and
//! consumed by the storage engines. Identifiers are lowercase hex strings;
//! timestamps are decimal nanosecond strings.

use crate::models::value::{AttributeList, CanonicalValue, ResourceDesc, ScopeDesc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Kind of span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// Default span kind (internal operation).
    #[default]
    Internal,
    /// The span represents a server handling a request.
    Server,
    /// The span represents a client making a request.
    Client,
    /// The span represents a producer sending a message.
    Producer,
    /// The span represents a consumer receiving a message.
    Consumer,
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
            Self::Producer => write!(f, "producer"),
            Self::Consumer => write!(f, "consumer"),
        }
    }
}

impl std::str::FromStr for SpanKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(Self::Internal),
            "server" => Ok(Self::Server),
            "client" => Ok(Self::Client),
            "producer" => Ok(Self::Producer),
            "consumer" => Ok(Self::Consumer),
            other => Err(format!("unknown span kind: {other}")),
        }
    }
}

/// Status code for a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusCode {
    /// No status was recorded.
    #[default]
    Unset,
    /// The span completed without error.
    Ok,
    /// The span encountered an error.
    Error,
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for StatusCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unset" => Ok(Self::Unset),
            "ok" => Ok(Self::Ok),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown status code: {other}")),
        }
    }
}

/// The status of a span.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpanStatus {
    /// The status code.
    #[serde(default)]
    pub code: StatusCode,
    /// Optional human-readable status message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// An event within a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanEvent {
    /// Timestamp when the event occurred, in decimal nanoseconds.
    pub time_unix_nano: String,
    /// The name of the event.
    pub name: String,
    /// Additional attributes for the event; absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeList>,
}

/// A link from one span to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanLink {
    /// Trace id of the linked span, lowercase hex.
    pub trace_id: String,
    /// Span id of the linked span, lowercase hex.
    pub span_id: String,
    /// Additional attributes for the link; absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeList>,
}

/// A span representing a unit of work in a distributed trace.
///
/// # Example
///
/// ```
/// use sightline::models::{Span, SpanKind};
///
/// let span = Span::new(
///     "0123456789abcdef0123456789abcdef",
///     "0123456789abcdef",
///     "HTTP GET /api/users",
///     "api-service",
/// )
/// .with_kind(SpanKind::Server)
/// .with_time_range("1700000000000000000", "1700000000500000000");
///
/// assert!(span.validate_span().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// Trace id, lowercase hex.
    #[validate(length(min = 1, message = "Trace ID cannot be empty"))]
    pub trace_id: String,

    /// Span id, lowercase hex.
    #[validate(length(min = 1, message = "Span ID cannot be empty"))]
    pub span_id: String,

    /// Parent span id (None for root spans).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    /// The name/operation of this span.
    #[validate(length(min = 1, message = "Span name cannot be empty"))]
    pub name: String,

    /// The service that generated this span, from `service.name`.
    pub service: String,

    /// The kind of span.
    #[serde(default)]
    pub kind: SpanKind,

    /// The status of the span.
    #[serde(default)]
    pub status: SpanStatus,

    /// Start timestamp, decimal nanoseconds.
    pub start_time_unix_nano: String,

    /// End timestamp, decimal nanoseconds.
    pub end_time_unix_nano: String,

    /// Span attributes; absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeList>,

    /// Events that occurred during the span.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SpanEvent>,

    /// Links to other spans.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<SpanLink>,

    /// The resource that produced this span.
    #[serde(default)]
    pub resource: ResourceDesc,

    /// The instrumentation scope that produced this span.
    #[serde(default)]
    pub scope: ScopeDesc,
}

/// Errors that can occur during span validation.
#[derive(Debug, Error)]
pub enum SpanValidationError {
    /// The trace ID is empty.
    #[error("Trace ID cannot be empty")]
    EmptyTraceId,

    /// The span ID is empty.
    #[error("Span ID cannot be empty")]
    EmptySpanId,

    /// The span name is empty.
    #[error("Span name cannot be empty")]
    EmptyName,

    /// A timestamp is not a storable decimal nanosecond value.
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    /// The end time is before the start time.
    #[error("End time cannot be before start time")]
    InvalidTimeRange,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Parses a decimal nanosecond string into the storage-representable range.
pub(crate) fn parse_storable_nanos(text: &str) -> Option<i64> {
    text.parse::<i64>().ok()
}

impl Span {
    /// Creates a new span with zeroed timestamps.
    #[must_use]
    pub fn new(
        trace_id: impl Into<String>,
        span_id: impl Into<String>,
        name: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            parent_span_id: None,
            name: name.into(),
            service: service.into(),
            kind: SpanKind::default(),
            status: SpanStatus::default(),
            start_time_unix_nano: "0".to_string(),
            end_time_unix_nano: "0".to_string(),
            attributes: None,
            events: Vec::new(),
            links: Vec::new(),
            resource: ResourceDesc::default(),
            scope: ScopeDesc::default(),
        }
    }

    /// Sets the parent span ID.
    #[must_use]
    pub fn with_parent(mut self, parent_span_id: impl Into<String>) -> Self {
        self.parent_span_id = Some(parent_span_id.into());
        self
    }

    /// Sets the span kind.
    #[must_use]
    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the span status.
    #[must_use]
    pub fn with_status(mut self, code: StatusCode, message: impl Into<String>) -> Self {
        self.status = SpanStatus {
            code,
            message: message.into(),
        };
        self
    }

    /// Sets start and end timestamps from decimal nanosecond strings.
    #[must_use]
    pub fn with_time_range(
        mut self,
        start_nanos: impl Into<String>,
        end_nanos: impl Into<String>,
    ) -> Self {
        self.start_time_unix_nano = start_nanos.into();
        self.end_time_unix_nano = end_nanos.into();
        self
    }

    /// Adds an attribute to the span.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: CanonicalValue) -> Self {
        let mut pairs = self.attributes.take().map(|list| list.0).unwrap_or_default();
        pairs.push(crate::models::value::KeyValuePair {
            key: key.into(),
            value: Some(value),
        });
        self.attributes = Some(AttributeList::from_pairs(pairs));
        self
    }

    /// Returns the span duration in nanoseconds, if both timestamps parse.
    #[must_use]
    pub fn duration_nanos(&self) -> Option<i64> {
        let start = parse_storable_nanos(&self.start_time_unix_nano)?;
        let end = parse_storable_nanos(&self.end_time_unix_nano)?;
        end.checked_sub(start)
    }

    /// Returns true if this is a root span (no parent).
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }

    /// Validates the span for ingestion.
    ///
    /// # Errors
    ///
    /// Returns an error if ids or the name are empty, if a timestamp is not
    /// a storable decimal value, or if the end time precedes the start time.
    pub fn validate_span(&self) -> Result<(), SpanValidationError> {
        if self.trace_id.is_empty() {
            return Err(SpanValidationError::EmptyTraceId);
        }
        if self.span_id.is_empty() {
            return Err(SpanValidationError::EmptySpanId);
        }
        if self.name.is_empty() {
            return Err(SpanValidationError::EmptyName);
        }
        let start = parse_storable_nanos(&self.start_time_unix_nano).ok_or_else(|| {
            SpanValidationError::InvalidTimestamp(self.start_time_unix_nano.clone())
        })?;
        let end = parse_storable_nanos(&self.end_time_unix_nano)
            .ok_or_else(|| SpanValidationError::InvalidTimestamp(self.end_time_unix_nano.clone()))?;
        if end < start {
            return Err(SpanValidationError::InvalidTimeRange);
        }
        self.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_span() -> Span {
        Span::new(
            "0af7651916cd43dd8448eb211c80319c",
            "b7ad6b7169203331",
            "GET /api",
            "api-service",
        )
        .with_time_range("1700000000000000000", "1700000000000000100")
    }

    #[test]
    fn test_span_new_is_root() {
        let span = test_span();
        assert!(span.is_root());
        assert_eq!(span.status.code, StatusCode::Unset);
        assert!(span.attributes.is_none());
    }

    #[test]
    fn test_span_with_parent() {
        let span = test_span().with_parent("00f067aa0ba902b7");
        assert!(!span.is_root());
    }

    #[test]
    fn test_span_duration() {
        let span = test_span();
        assert_eq!(span.duration_nanos(), Some(100));
    }

    #[test]
    fn test_span_validation_success() {
        assert!(test_span().validate_span().is_ok());
    }

    #[test]
    fn test_span_validation_empty_trace_id() {
        let span = Span::new("", "b7ad6b7169203331", "op", "svc");
        assert!(matches!(
            span.validate_span(),
            Err(SpanValidationError::EmptyTraceId)
        ));
    }

    #[test]
    fn test_span_validation_bad_timestamp() {
        let span = test_span().with_time_range("not-a-number", "0");
        assert!(matches!(
            span.validate_span(),
            Err(SpanValidationError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_span_validation_inverted_range() {
        let span = test_span().with_time_range("200", "100");
        assert!(matches!(
            span.validate_span(),
            Err(SpanValidationError::InvalidTimeRange)
        ));
    }

    #[test]
    fn test_span_serialization_camel_case() {
        let span = test_span();
        let json = serde_json::to_string(&span).unwrap();
        assert!(json.contains("\"traceId\":\"0af7651916cd43dd8448eb211c80319c\""));
        assert!(json.contains("\"startTimeUnixNano\":\"1700000000000000000\""));
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            SpanKind::Internal,
            SpanKind::Server,
            SpanKind::Client,
            SpanKind::Producer,
            SpanKind::Consumer,
        ] {
            let parsed: SpanKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("sidecar".parse::<SpanKind>().is_err());
    }
}
