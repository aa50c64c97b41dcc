//! Log record data model.

use crate::models::trace::parse_storable_nanos;
use crate::models::value::{AttributeList, CanonicalValue, ResourceDesc, ScopeDesc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse severity level derived from the OTLP severity number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    /// Severity numbers 1-4.
    Trace,
    /// Severity numbers 5-8.
    Debug,
    /// Severity numbers 9-12, and the default for unknown numbers.
    #[default]
    Info,
    /// Severity numbers 13-16.
    Warn,
    /// Severity numbers 17-20.
    Error,
    /// Severity numbers 21-24.
    Fatal,
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

impl SeverityLevel {
    /// Maps an OTLP severity number to a coarse level.
    ///
    /// <https://opentelemetry.io/docs/specs/otel/logs/data-model/#field-severitynumber>
    #[must_use]
    pub fn from_number(severity: i32) -> Self {
        match severity {
            1..=4 => Self::Trace,
            5..=8 => Self::Debug,
            13..=16 => Self::Warn,
            17..=20 => Self::Error,
            21..=24 => Self::Fatal,
            _ => Self::Info,
        }
    }
}

/// A single log record.
///
/// # Example
///
/// ```
/// use sightline::models::LogRecord;
///
/// let record = LogRecord::new("1700000000000000000", "disk full", "storage-node")
///     .with_severity(17, "ERROR");
///
/// assert!(record.validate_record().is_ok());
/// assert_eq!(record.severity_level().to_string(), "error");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Timestamp, decimal nanoseconds.
    pub time_unix_nano: String,

    /// Collector-side observation timestamp, if distinct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_time_unix_nano: Option<String>,

    /// Raw OTLP severity number (0 when unset).
    #[serde(default)]
    pub severity_number: i32,

    /// Producer-supplied severity text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub severity_text: String,

    /// The log body; absent when the wire variant was unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<CanonicalValue>,

    /// The service that produced this record, from `service.name`.
    pub service: String,

    /// Correlated trace id, lowercase hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// Correlated span id, lowercase hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,

    /// Record attributes; absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeList>,

    /// The resource that produced this record.
    #[serde(default)]
    pub resource: ResourceDesc,

    /// The instrumentation scope that produced this record.
    #[serde(default)]
    pub scope: ScopeDesc,
}

/// Errors that can occur during log record validation.
#[derive(Debug, Error)]
pub enum LogValidationError {
    /// The timestamp is not a storable decimal nanosecond value.
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),
}

impl LogRecord {
    /// Creates a new record with a string body.
    #[must_use]
    pub fn new(
        time_unix_nano: impl Into<String>,
        body: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            time_unix_nano: time_unix_nano.into(),
            observed_time_unix_nano: None,
            severity_number: 0,
            severity_text: String::new(),
            body: Some(CanonicalValue::String(body.into())),
            service: service.into(),
            trace_id: None,
            span_id: None,
            attributes: None,
            resource: ResourceDesc::default(),
            scope: ScopeDesc::default(),
        }
    }

    /// Sets the severity number and text.
    #[must_use]
    pub fn with_severity(mut self, number: i32, text: impl Into<String>) -> Self {
        self.severity_number = number;
        self.severity_text = text.into();
        self
    }

    /// Adds an attribute to the record.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut pairs = self.attributes.take().map(|list| list.0).unwrap_or_default();
        pairs.push(crate::models::value::KeyValuePair {
            key: key.into(),
            value: Some(CanonicalValue::String(value.into())),
        });
        self.attributes = Some(AttributeList::from_pairs(pairs));
        self
    }

    /// Sets the correlated trace context.
    #[must_use]
    pub fn with_trace_context(
        mut self,
        trace_id: impl Into<String>,
        span_id: impl Into<String>,
    ) -> Self {
        self.trace_id = Some(trace_id.into());
        self.span_id = Some(span_id.into());
        self
    }

    /// Returns the coarse severity level for this record.
    #[must_use]
    pub fn severity_level(&self) -> SeverityLevel {
        SeverityLevel::from_number(self.severity_number)
    }

    /// Renders the body as display text: string bodies verbatim, any other
    /// body as its JSON text, absent bodies as the empty string.
    #[must_use]
    pub fn body_text(&self) -> String {
        match &self.body {
            None => String::new(),
            Some(CanonicalValue::String(s)) => s.clone(),
            Some(other) => serde_json::to_string(other).unwrap_or_default(),
        }
    }

    /// Validates the record for ingestion.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp is not a storable decimal value.
    pub fn validate_record(&self) -> Result<(), LogValidationError> {
        parse_storable_nanos(&self.time_unix_nano)
            .ok_or_else(|| LogValidationError::InvalidTimestamp(self.time_unix_nano.clone()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(SeverityLevel::from_number(1), SeverityLevel::Trace);
        assert_eq!(SeverityLevel::from_number(8), SeverityLevel::Debug);
        assert_eq!(SeverityLevel::from_number(9), SeverityLevel::Info);
        assert_eq!(SeverityLevel::from_number(16), SeverityLevel::Warn);
        assert_eq!(SeverityLevel::from_number(17), SeverityLevel::Error);
        assert_eq!(SeverityLevel::from_number(24), SeverityLevel::Fatal);
        assert_eq!(SeverityLevel::from_number(0), SeverityLevel::Info);
        assert_eq!(SeverityLevel::from_number(99), SeverityLevel::Info);
    }

    #[test]
    fn test_body_text_variants() {
        let record = LogRecord::new("0", "plain text", "svc");
        assert_eq!(record.body_text(), "plain text");

        let mut record = LogRecord::new("0", "", "svc");
        record.body = Some(CanonicalValue::int(42));
        assert_eq!(record.body_text(), r#"{"intValue":"42"}"#);

        record.body = None;
        assert_eq!(record.body_text(), "");
    }

    #[test]
    fn test_validation_rejects_bad_timestamp() {
        let record = LogRecord::new("later", "msg", "svc");
        assert!(matches!(
            record.validate_record(),
            Err(LogValidationError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_serialization_camel_case() {
        let record = LogRecord::new("1700000000000000000", "hello", "svc")
            .with_trace_context("0af7651916cd43dd8448eb211c80319c", "b7ad6b7169203331");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"timeUnixNano\":\"1700000000000000000\""));
        assert!(json.contains("\"traceId\""));
    }
}
