//! Per-signal search filters.
//!
//! Filters arrive from the HTTP layer as structured values, never as query
//! text. Exact-match fields compile to equality predicates, ranges to
//! inclusive bounds, attribute maps to one predicate per entry. Timestamps
//! and durations are decimal nanosecond strings, like everywhere else.

use crate::models::{MetricKind, SpanKind, StatusCode};
use crate::query::cursor::SortOrder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Page size applied when a filter does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Hard ceiling on a single page.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Clamps a requested limit into the allowed page-size range.
#[must_use]
pub fn effective_limit(requested: Option<u32>) -> usize {
    requested
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE) as usize
}

/// Search filter for spans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceFilter {
    /// Exact trace id.
    #[serde(default)]
    pub trace_id: Option<String>,
    /// Exact span id.
    #[serde(default)]
    pub span_id: Option<String>,
    /// Exact service name.
    #[serde(default)]
    pub service: Option<String>,
    /// Exact span name.
    #[serde(default)]
    pub name: Option<String>,
    /// Span kind.
    #[serde(default)]
    pub kind: Option<SpanKind>,
    /// Status code.
    #[serde(default)]
    pub status: Option<StatusCode>,
    /// Inclusive lower bound on start time, decimal nanoseconds.
    #[serde(default)]
    pub start_nanos: Option<String>,
    /// Inclusive upper bound on start time, decimal nanoseconds.
    #[serde(default)]
    pub end_nanos: Option<String>,
    /// Inclusive lower bound on duration, decimal nanoseconds.
    #[serde(default)]
    pub min_duration_nanos: Option<String>,
    /// Inclusive upper bound on duration, decimal nanoseconds.
    #[serde(default)]
    pub max_duration_nanos: Option<String>,
    /// Span attribute equality filters; all must match.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Resource attribute equality filters; all must match.
    #[serde(default)]
    pub resource_attributes: BTreeMap<String, String>,
    /// Sort direction on (start time, span id).
    #[serde(default)]
    pub order: SortOrder,
    /// Page size; clamped to [`MAX_PAGE_SIZE`].
    #[serde(default)]
    pub limit: Option<u32>,
    /// Opaque cursor from the previous page.
    #[serde(default)]
    pub cursor: Option<String>,
}

impl TraceFilter {
    /// Creates an empty filter (matches everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the trace id filter.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Sets the service filter.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Sets the span name filter.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the status filter.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the start-time range, decimal nanoseconds, both inclusive.
    #[must_use]
    pub fn with_time_range(
        mut self,
        start_nanos: impl Into<String>,
        end_nanos: impl Into<String>,
    ) -> Self {
        self.start_nanos = Some(start_nanos.into());
        self.end_nanos = Some(end_nanos.into());
        self
    }

    /// Adds a span attribute equality filter.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the sort direction.
    #[must_use]
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the pagination cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// Search filter for log records.
///
/// Logs order on timestamp alone: there is no stable tiebreaker column, so
/// rows sharing one exact timestamp can straddle a page boundary and be
/// skipped or repeated across pages. Known limitation of the layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    /// Exact service name.
    #[serde(default)]
    pub service: Option<String>,
    /// Exact correlated trace id.
    #[serde(default)]
    pub trace_id: Option<String>,
    /// Exact correlated span id.
    #[serde(default)]
    pub span_id: Option<String>,
    /// Inclusive lower bound on severity number.
    #[serde(default)]
    pub min_severity: Option<i32>,
    /// Inclusive upper bound on severity number.
    #[serde(default)]
    pub max_severity: Option<i32>,
    /// Free-text containment on the body; the literal matches verbatim.
    #[serde(default)]
    pub body_contains: Option<String>,
    /// Inclusive lower bound on timestamp, decimal nanoseconds.
    #[serde(default)]
    pub start_nanos: Option<String>,
    /// Inclusive upper bound on timestamp, decimal nanoseconds.
    #[serde(default)]
    pub end_nanos: Option<String>,
    /// Record attribute equality filters; all must match.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Resource attribute equality filters; all must match.
    #[serde(default)]
    pub resource_attributes: BTreeMap<String, String>,
    /// Sort direction on timestamp.
    #[serde(default)]
    pub order: SortOrder,
    /// Page size; clamped to [`MAX_PAGE_SIZE`].
    #[serde(default)]
    pub limit: Option<u32>,
    /// Opaque cursor from the previous page.
    #[serde(default)]
    pub cursor: Option<String>,
}

impl LogFilter {
    /// Creates an empty filter (matches everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service filter.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Sets the severity number range, both inclusive.
    #[must_use]
    pub fn with_severity_range(mut self, min: i32, max: i32) -> Self {
        self.min_severity = Some(min);
        self.max_severity = Some(max);
        self
    }

    /// Sets the body containment filter.
    #[must_use]
    pub fn with_body_contains(mut self, pattern: impl Into<String>) -> Self {
        self.body_contains = Some(pattern.into());
        self
    }

    /// Sets the timestamp range, decimal nanoseconds, both inclusive.
    #[must_use]
    pub fn with_time_range(
        mut self,
        start_nanos: impl Into<String>,
        end_nanos: impl Into<String>,
    ) -> Self {
        self.start_nanos = Some(start_nanos.into());
        self.end_nanos = Some(end_nanos.into());
        self
    }

    /// Adds a record attribute equality filter.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the sort direction.
    #[must_use]
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the pagination cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// Search filter for metric points.
///
/// The kind is mandatory: it selects the table (and column projection) the
/// query runs against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricFilter {
    /// The metric kind to search. Selects the backing table.
    pub kind: MetricKind,
    /// Exact metric name.
    #[serde(default)]
    pub name: Option<String>,
    /// Exact service name.
    #[serde(default)]
    pub service: Option<String>,
    /// Exact unit.
    #[serde(default)]
    pub unit: Option<String>,
    /// Inclusive lower bound on point time, decimal nanoseconds.
    #[serde(default)]
    pub start_nanos: Option<String>,
    /// Inclusive upper bound on point time, decimal nanoseconds.
    #[serde(default)]
    pub end_nanos: Option<String>,
    /// Point attribute equality filters; all must match.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Resource attribute equality filters; all must match.
    #[serde(default)]
    pub resource_attributes: BTreeMap<String, String>,
    /// Sort direction on (time, point hash).
    #[serde(default)]
    pub order: SortOrder,
    /// Page size; clamped to [`MAX_PAGE_SIZE`].
    #[serde(default)]
    pub limit: Option<u32>,
    /// Opaque cursor from the previous page.
    #[serde(default)]
    pub cursor: Option<String>,
}

impl MetricFilter {
    /// Creates an empty filter for one metric kind.
    #[must_use]
    pub fn new(kind: MetricKind) -> Self {
        Self {
            kind,
            name: None,
            service: None,
            unit: None,
            start_nanos: None,
            end_nanos: None,
            attributes: BTreeMap::new(),
            resource_attributes: BTreeMap::new(),
            order: SortOrder::default(),
            limit: None,
            cursor: None,
        }
    }

    /// Sets the metric name filter.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the service filter.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Sets the point-time range, decimal nanoseconds, both inclusive.
    #[must_use]
    pub fn with_time_range(
        mut self,
        start_nanos: impl Into<String>,
        end_nanos: impl Into<String>,
    ) -> Self {
        self.start_nanos = Some(start_nanos.into());
        self.end_nanos = Some(end_nanos.into());
        self
    }

    /// Adds a point attribute equality filter.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the sort direction.
    #[must_use]
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the pagination cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit_defaults_and_clamps() {
        assert_eq!(effective_limit(None), 100);
        assert_eq!(effective_limit(Some(0)), 1);
        assert_eq!(effective_limit(Some(50)), 50);
        assert_eq!(effective_limit(Some(10_000)), 1000);
    }

    #[test]
    fn test_builder_pattern() {
        let filter = TraceFilter::new()
            .with_service("checkout")
            .with_time_range("0", "1700000000000000000")
            .with_attribute("http.method", "GET")
            .with_limit(25);

        assert_eq!(filter.service.as_deref(), Some("checkout"));
        assert_eq!(filter.attributes.len(), 1);
        assert_eq!(filter.limit, Some(25));
        assert_eq!(filter.order, SortOrder::Desc);
    }

    #[test]
    fn test_filter_serde_camel_case() {
        let filter = LogFilter::new().with_body_contains("timeout");
        let json = serde_json::to_string(&filter).unwrap();
        assert!(json.contains("\"bodyContains\":\"timeout\""));
    }
}
