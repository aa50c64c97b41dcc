//! Metric data models.
//!
//! A [`MetricPoint`] is one flattened data point: the metric identity
//! (name + kind), descriptive metadata, the owning resource and scope, and
//! the kind-specific payload as a [`MetricData`] variant. Adding a metric
//! kind means adding a variant here and updating every exhaustive match.
//!
//! 64-bit counters (`count`, `bucket_counts`, `zero_count`, integer point
//! values) are decimal strings end-to-end; only genuinely floating-point
//! quantities (sums, bounds, quantiles) are `f64`.

use crate::models::trace::parse_storable_nanos;
use crate::models::value::{AttributeList, ResourceDesc, ScopeDesc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// The five metric kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// A point-in-time measurement.
    Gauge,
    /// A cumulative or delta sum, optionally monotonic.
    Sum,
    /// A fixed-boundary histogram.
    Histogram,
    /// A base-2 exponential histogram.
    ExponentialHistogram,
    /// A pre-aggregated quantile summary.
    Summary,
}

impl MetricKind {
    /// All kinds, in wire declaration order.
    pub const ALL: [Self; 5] = [
        Self::Gauge,
        Self::Sum,
        Self::Histogram,
        Self::ExponentialHistogram,
        Self::Summary,
    ];
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gauge => write!(f, "gauge"),
            Self::Sum => write!(f, "sum"),
            Self::Histogram => write!(f, "histogram"),
            Self::ExponentialHistogram => write!(f, "exponential_histogram"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

impl std::str::FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gauge" => Ok(Self::Gauge),
            "sum" => Ok(Self::Sum),
            "histogram" => Ok(Self::Histogram),
            "exponential_histogram" => Ok(Self::ExponentialHistogram),
            "summary" => Ok(Self::Summary),
            other => Err(format!("unknown metric kind: {other}")),
        }
    }
}

/// A metric identity: the unit of grouping for discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricIdentity {
    /// The metric name.
    pub name: String,
    /// The metric kind.
    pub kind: MetricKind,
}

/// A gauge or sum point value: double, or a 64-bit integer as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberValue {
    /// A double value.
    AsDouble(f64),
    /// A 64-bit integer value, decimal string.
    AsInt(String),
}

impl NumberValue {
    /// Creates an integer value from a native 64-bit integer.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::AsInt(value.to_string())
    }
}

/// Payload of a gauge point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeData {
    /// The measured value.
    pub value: NumberValue,
    /// OTLP data point flags.
    #[serde(default)]
    pub flags: u32,
}

/// Payload of a sum point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SumData {
    /// The accumulated value.
    pub value: NumberValue,
    /// True when the sum only increases.
    #[serde(default)]
    pub monotonic: bool,
    /// OTLP data point flags.
    #[serde(default)]
    pub flags: u32,
}

/// Payload of a fixed-boundary histogram point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramData {
    /// Total observation count, decimal string.
    pub count: String,
    /// Sum of observations, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    /// Minimum observation, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum observation, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Per-bucket counts, decimal strings; one more entry than bounds.
    #[serde(default)]
    pub bucket_counts: Vec<String>,
    /// Inclusive upper bucket boundaries.
    #[serde(default)]
    pub explicit_bounds: Vec<f64>,
    /// OTLP data point flags.
    #[serde(default)]
    pub flags: u32,
}

/// One signed bucket run of an exponential histogram.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExponentialBuckets {
    /// Index offset of the first bucket.
    #[serde(default)]
    pub offset: i32,
    /// Bucket counts, decimal strings.
    #[serde(default)]
    pub bucket_counts: Vec<String>,
}

/// Payload of an exponential histogram point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExponentialHistogramData {
    /// Total observation count, decimal string.
    pub count: String,
    /// Sum of observations, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    /// Minimum observation, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum observation, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Base-2 scale factor.
    #[serde(default)]
    pub scale: i32,
    /// Count of observations in the zero bucket, decimal string.
    #[serde(default)]
    pub zero_count: String,
    /// Width of the zero bucket.
    #[serde(default)]
    pub zero_threshold: f64,
    /// Positive-range buckets.
    #[serde(default)]
    pub positive: ExponentialBuckets,
    /// Negative-range buckets.
    #[serde(default)]
    pub negative: ExponentialBuckets,
    /// OTLP data point flags.
    #[serde(default)]
    pub flags: u32,
}

/// One quantile of a summary point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantileValue {
    /// The quantile in `[0, 1]`.
    pub quantile: f64,
    /// The value at that quantile.
    pub value: f64,
}

/// Payload of a summary point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    /// Total observation count, decimal string.
    pub count: String,
    /// Sum of observations.
    #[serde(default)]
    pub sum: f64,
    /// The recorded quantiles.
    #[serde(default)]
    pub quantile_values: Vec<QuantileValue>,
    /// OTLP data point flags.
    #[serde(default)]
    pub flags: u32,
}

/// Kind-specific payload of a metric point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricData {
    /// Gauge payload.
    Gauge(GaugeData),
    /// Sum payload.
    Sum(SumData),
    /// Histogram payload.
    Histogram(HistogramData),
    /// Exponential histogram payload.
    ExponentialHistogram(ExponentialHistogramData),
    /// Summary payload.
    Summary(SummaryData),
}

impl MetricData {
    /// Returns the kind tag for this payload.
    #[must_use]
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Gauge(_) => MetricKind::Gauge,
            Self::Sum(_) => MetricKind::Sum,
            Self::Histogram(_) => MetricKind::Histogram,
            Self::ExponentialHistogram(_) => MetricKind::ExponentialHistogram,
            Self::Summary(_) => MetricKind::Summary,
        }
    }
}

/// An exemplar attached to a metric point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exemplar {
    /// Timestamp of the exemplar observation, decimal nanoseconds.
    pub time_unix_nano: String,
    /// The observed value.
    pub value: NumberValue,
    /// Correlated trace id, lowercase hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Correlated span id, lowercase hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    /// Attributes filtered off the point at sampling time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_attributes: Option<AttributeList>,
}

/// A single flattened metric data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPoint {
    /// The metric name.
    pub name: String,

    /// Unit of measurement, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Human description, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The service that produced this point, from `service.name`.
    pub service: String,

    /// Start of the aggregation window, decimal nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_unix_nano: Option<String>,

    /// Point timestamp, decimal nanoseconds.
    pub time_unix_nano: String,

    /// Point attributes; absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeList>,

    /// Exemplars (never present for summaries).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exemplars: Vec<Exemplar>,

    /// The kind-specific payload.
    pub data: MetricData,

    /// The resource that produced this point.
    #[serde(default)]
    pub resource: ResourceDesc,

    /// The instrumentation scope that produced this point.
    #[serde(default)]
    pub scope: ScopeDesc,
}

/// Errors that can occur during metric point validation.
#[derive(Debug, Error)]
pub enum MetricValidationError {
    /// The metric name is empty.
    #[error("Metric name cannot be empty")]
    EmptyName,

    /// The timestamp is not a storable decimal nanosecond value.
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),
}

impl MetricPoint {
    /// Returns the identity (name + kind) of this point.
    #[must_use]
    pub fn identity(&self) -> MetricIdentity {
        MetricIdentity {
            name: self.name.clone(),
            kind: self.data.kind(),
        }
    }

    /// Returns the kind tag of this point.
    #[must_use]
    pub fn kind(&self) -> MetricKind {
        self.data.kind()
    }

    /// Computes the pagination tiebreaker for this point.
    ///
    /// A stable 64-bit hash over (timestamp, service, name, serialized
    /// attributes). Stored as a column at write time so both storage
    /// engines paginate on the same value across processes.
    #[must_use]
    pub fn point_hash(&self) -> u64 {
        let attrs = self
            .attributes
            .as_ref()
            .map(AttributeList::storage_map)
            .unwrap_or_default();
        let mut hash = fnv1a64_init();
        hash = fnv1a64_update(hash, self.time_unix_nano.as_bytes());
        hash = fnv1a64_update(hash, self.service.as_bytes());
        hash = fnv1a64_update(hash, self.name.as_bytes());
        for (key, value) in &attrs {
            hash = fnv1a64_update(hash, key.as_bytes());
            hash = fnv1a64_update(hash, value.as_bytes());
        }
        hash
    }

    /// Validates the point for ingestion.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or the timestamp is not a
    /// storable decimal value.
    pub fn validate_point(&self) -> Result<(), MetricValidationError> {
        if self.name.is_empty() {
            return Err(MetricValidationError::EmptyName);
        }
        parse_storable_nanos(&self.time_unix_nano)
            .ok_or_else(|| MetricValidationError::InvalidTimestamp(self.time_unix_nano.clone()))?;
        Ok(())
    }
}

const FNV64_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a64_init() -> u64 {
    FNV64_OFFSET
}

/// FNV-1a over `bytes` plus a trailing separator byte, so adjacent fields
/// cannot alias.
fn fnv1a64_update(mut hash: u64, bytes: &[u8]) -> u64 {
    for byte in bytes.iter().chain(std::iter::once(&0x1f)) {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV64_PRIME);
    }
    hash
}

/// One attribute group of a discovered metric: key to observed values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttributeSummary {
    /// Observed values per attribute key, capped at read time.
    #[serde(default)]
    pub values: BTreeMap<String, Vec<String>>,
    /// True when any key in this group had values dropped by the cap.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// A metric identity and its observed attribute shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredMetric {
    /// The metric name.
    pub name: String,
    /// The metric kind.
    pub kind: MetricKind,
    /// Unit of measurement, first seen wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Human description, first seen wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Observed point attributes.
    pub attributes: AttributeSummary,
    /// Observed resource attributes.
    pub resource_attributes: AttributeSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::value::{AttributeList, CanonicalValue, KeyValuePair};

    fn gauge_point(name: &str, ts: &str) -> MetricPoint {
        MetricPoint {
            name: name.to_string(),
            unit: None,
            description: None,
            service: "svc".to_string(),
            start_time_unix_nano: None,
            time_unix_nano: ts.to_string(),
            attributes: None,
            exemplars: Vec::new(),
            data: MetricData::Gauge(GaugeData {
                value: NumberValue::AsDouble(1.5),
                flags: 0,
            }),
            resource: Default::default(),
            scope: Default::default(),
        }
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in MetricKind::ALL {
            let parsed: MetricKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("meter".parse::<MetricKind>().is_err());
    }

    #[test]
    fn test_identity() {
        let point = gauge_point("cpu.usage", "0");
        assert_eq!(
            point.identity(),
            MetricIdentity {
                name: "cpu.usage".to_string(),
                kind: MetricKind::Gauge,
            }
        );
    }

    #[test]
    fn test_point_hash_is_stable_and_attribute_sensitive() {
        let a = gauge_point("cpu.usage", "100");
        let b = gauge_point("cpu.usage", "100");
        assert_eq!(a.point_hash(), b.point_hash());

        let mut c = gauge_point("cpu.usage", "100");
        c.attributes = Some(AttributeList::from_pairs(vec![KeyValuePair {
            key: "core".to_string(),
            value: Some(CanonicalValue::int(3)),
        }]));
        assert_ne!(a.point_hash(), c.point_hash());

        let d = gauge_point("cpu.usage", "101");
        assert_ne!(a.point_hash(), d.point_hash());
    }

    #[test]
    fn test_validation() {
        assert!(gauge_point("ok", "123").validate_point().is_ok());
        assert!(matches!(
            gauge_point("", "123").validate_point(),
            Err(MetricValidationError::EmptyName)
        ));
        assert!(matches!(
            gauge_point("ok", "not-nanos").validate_point(),
            Err(MetricValidationError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_int_counters_stay_textual() {
        let data = MetricData::Sum(SumData {
            value: NumberValue::AsInt("9007199254740993".to_string()),
            monotonic: true,
            flags: 0,
        });
        let json = serde_json::to_string(&data).unwrap();
        // Beyond 2^53: must not appear as a bare JSON number.
        assert!(json.contains("\"asInt\":\"9007199254740993\""));
    }
}
