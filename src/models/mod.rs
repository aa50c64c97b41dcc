//! Canonical data models.
//!
//! Wire-format-independent entities produced by the ingestion normalizer,
//! written by the storage engines, and returned from searches. Identifiers
//! are lowercase hex; timestamps and 64-bit counters are decimal strings.

pub mod log;
pub mod metric;
pub mod trace;
pub mod value;

pub use log::{LogRecord, LogValidationError, SeverityLevel};
pub use metric::{
    AttributeSummary, DiscoveredMetric, Exemplar, ExponentialBuckets, ExponentialHistogramData,
    GaugeData, HistogramData, MetricData, MetricIdentity, MetricKind, MetricPoint,
    MetricValidationError, NumberValue, QuantileValue, SumData, SummaryData,
};
pub use trace::{
    Span, SpanEvent, SpanKind, SpanLink, SpanStatus, SpanValidationError, StatusCode,
};
pub use value::{
    AttributeList, CanonicalValue, KeyValueList, KeyValuePair, ResourceDesc, ScopeDesc, ValueList,
};
