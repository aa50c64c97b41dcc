//! Wire payload decoding and normalization.
//!
//! [`decode`] turns raw payload bytes into a [`CanonicalRequest`]: raw
//! trace/span ids become lowercase hex, 64-bit wire integers become decimal
//! strings, and every `AnyValue` becomes the matching [`CanonicalValue`]
//! case. Items that cannot form a valid canonical entity (missing ids,
//! valueless points, unstorable timestamps) are dropped and counted toward
//! the request's partial-success envelope.
//!
//! Decoding is pure with respect to the input bytes: no clocks, no shared
//! state, same bytes in, same request out.

use crate::error::EngineError;
use crate::ingest::response::PartialSuccess;
use crate::models::metric::{
    Exemplar, ExponentialBuckets, ExponentialHistogramData, GaugeData, HistogramData, MetricData,
    MetricPoint, NumberValue, QuantileValue, SumData, SummaryData,
};
use crate::models::value::{
    AttributeList, CanonicalValue, KeyValueList, KeyValuePair, ResourceDesc, ScopeDesc, ValueList,
};
use crate::models::{LogRecord, Span, SpanEvent, SpanKind, SpanLink, SpanStatus, StatusCode};
use crate::wire::proto::{collector, common, metrics, resource, trace};
use crate::wire::{SignalKind, WireFormat};
use prost::Message;

/// The accepted entities of one decoded request plus its rejection count.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    /// Entities that passed normalization.
    pub accepted: Vec<T>,
    /// Items dropped during normalization.
    pub rejected: i64,
}

impl<T> Normalized<T> {
    fn new() -> Self {
        Self {
            accepted: Vec::new(),
            rejected: 0,
        }
    }
}

/// A decoded request in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalRequest {
    /// A trace export request.
    Traces(Normalized<Span>),
    /// A log export request.
    Logs(Normalized<LogRecord>),
    /// A metric export request.
    Metrics(Normalized<MetricPoint>),
}

impl CanonicalRequest {
    /// The signal this request carries.
    #[must_use]
    pub fn signal(&self) -> SignalKind {
        match self {
            Self::Traces(_) => SignalKind::Traces,
            Self::Logs(_) => SignalKind::Logs,
            Self::Metrics(_) => SignalKind::Metrics,
        }
    }

    /// The partial-success outcome of normalizing this request.
    #[must_use]
    pub fn partial_success(&self) -> PartialSuccess {
        let (signal, rejected) = match self {
            Self::Traces(n) => (SignalKind::Traces, n.rejected),
            Self::Logs(n) => (SignalKind::Logs, n.rejected),
            Self::Metrics(n) => (SignalKind::Metrics, n.rejected),
        };
        PartialSuccess::rejecting(rejected, signal)
    }
}

/// Decodes a wire payload into a canonical request.
///
/// # Errors
///
/// Returns a [`EngineError::Decode`] error when the payload cannot be
/// parsed in the declared format. Item-level problems never fail the
/// request; they surface in the partial-success count instead.
pub fn decode(
    signal: SignalKind,
    format: WireFormat,
    bytes: &[u8],
) -> Result<CanonicalRequest, EngineError> {
    match (signal, format) {
        (SignalKind::Traces, WireFormat::Protobuf) => {
            let request = collector::trace::v1::ExportTraceServiceRequest::decode(bytes)
                .map_err(|e| EngineError::Decode(format!("malformed trace payload: {e}")))?;
            Ok(CanonicalRequest::Traces(normalize_trace_request(&request)))
        }
        (SignalKind::Traces, WireFormat::Json) => {
            let request: json::TracesRequest = serde_json::from_slice(bytes)
                .map_err(|e| EngineError::Decode(format!("malformed trace payload: {e}")))?;
            Ok(CanonicalRequest::Traces(json::normalize_traces(request)))
        }
        (SignalKind::Logs, WireFormat::Protobuf) => {
            let request = collector::logs::v1::ExportLogsServiceRequest::decode(bytes)
                .map_err(|e| EngineError::Decode(format!("malformed log payload: {e}")))?;
            Ok(CanonicalRequest::Logs(normalize_logs_request(&request)))
        }
        (SignalKind::Logs, WireFormat::Json) => {
            let request: json::LogsRequest = serde_json::from_slice(bytes)
                .map_err(|e| EngineError::Decode(format!("malformed log payload: {e}")))?;
            Ok(CanonicalRequest::Logs(json::normalize_logs(request)))
        }
        (SignalKind::Metrics, WireFormat::Protobuf) => {
            let request = collector::metrics::v1::ExportMetricsServiceRequest::decode(bytes)
                .map_err(|e| EngineError::Decode(format!("malformed metric payload: {e}")))?;
            Ok(CanonicalRequest::Metrics(normalize_metrics_request(
                &request,
            )))
        }
        (SignalKind::Metrics, WireFormat::Json) => {
            let request: json::MetricsRequest = serde_json::from_slice(bytes)
                .map_err(|e| EngineError::Decode(format!("malformed metric payload: {e}")))?;
            Ok(CanonicalRequest::Metrics(json::normalize_metrics(request)))
        }
    }
}

// ---- protobuf -> canonical -------------------------------------------------

fn any_value_to_canonical(value: &common::v1::AnyValue) -> Option<CanonicalValue> {
    use common::v1::any_value::Value;

    match value.value.as_ref()? {
        Value::StringValue(s) => Some(CanonicalValue::String(s.clone())),
        Value::BoolValue(b) => Some(CanonicalValue::Bool(*b)),
        Value::IntValue(i) => Some(CanonicalValue::Int(i.to_string())),
        Value::DoubleValue(d) => Some(CanonicalValue::Double(*d)),
        Value::BytesValue(b) => Some(CanonicalValue::Bytes(hex::encode(b))),
        Value::ArrayValue(array) => Some(CanonicalValue::Array(ValueList {
            values: array.values.iter().filter_map(any_value_to_canonical).collect(),
        })),
        Value::KvlistValue(kvlist) => Some(CanonicalValue::KvList(KeyValueList {
            values: kvlist
                .values
                .iter()
                .map(|pair| KeyValuePair {
                    key: pair.key.clone(),
                    value: pair.value.as_ref().and_then(any_value_to_canonical),
                })
                .collect(),
        })),
    }
}

fn attributes_from_proto(pairs: &[common::v1::KeyValue]) -> AttributeList {
    AttributeList::from_pairs(
        pairs
            .iter()
            .map(|pair| KeyValuePair {
                key: pair.key.clone(),
                value: pair.value.as_ref().and_then(any_value_to_canonical),
            })
            .collect(),
    )
}

fn optional_attributes(list: AttributeList) -> Option<AttributeList> {
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

fn hex_id(raw: &[u8]) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(hex::encode(raw))
    }
}

fn resource_from_proto(raw: Option<&resource::v1::Resource>) -> ResourceDesc {
    raw.map(|r| ResourceDesc {
        attributes: attributes_from_proto(&r.attributes),
        dropped_attributes_count: r.dropped_attributes_count,
    })
    .unwrap_or_default()
}

fn scope_from_proto(raw: Option<&common::v1::InstrumentationScope>) -> ScopeDesc {
    raw.map(|s| ScopeDesc {
        name: s.name.clone(),
        version: s.version.clone(),
        attributes: attributes_from_proto(&s.attributes),
        dropped_attributes_count: s.dropped_attributes_count,
    })
    .unwrap_or_default()
}

/// Resolves the service name: `service.name` resource attribute, falling
/// back to the scope name, falling back to `"unknown"`.
fn service_name(resource: &ResourceDesc, scope: &ScopeDesc) -> String {
    resource
        .service_name()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            if scope.name.is_empty() {
                "unknown".to_string()
            } else {
                scope.name.clone()
            }
        })
}

fn span_kind_from_wire(kind: i32) -> SpanKind {
    use trace::v1::span::span_kind;
    match kind {
        span_kind::SERVER => SpanKind::Server,
        span_kind::CLIENT => SpanKind::Client,
        span_kind::PRODUCER => SpanKind::Producer,
        span_kind::CONSUMER => SpanKind::Consumer,
        _ => SpanKind::Internal,
    }
}

fn status_from_wire(status: Option<&trace::v1::Status>) -> SpanStatus {
    status
        .map(|s| SpanStatus {
            code: match s.code {
                1 => StatusCode::Ok,
                2 => StatusCode::Error,
                _ => StatusCode::Unset,
            },
            message: s.message.clone(),
        })
        .unwrap_or_default()
}

fn normalize_trace_request(
    request: &collector::trace::v1::ExportTraceServiceRequest,
) -> Normalized<Span> {
    let mut out = Normalized::new();

    for resource_spans in &request.resource_spans {
        let resource = resource_from_proto(resource_spans.resource.as_ref());

        for scope_spans in &resource_spans.scope_spans {
            let scope = scope_from_proto(scope_spans.scope.as_ref());
            let service = service_name(&resource, &scope);

            for raw in &scope_spans.spans {
                let (Some(trace_id), Some(span_id)) =
                    (hex_id(&raw.trace_id), hex_id(&raw.span_id))
                else {
                    out.rejected += 1;
                    continue;
                };

                let span = Span {
                    trace_id,
                    span_id,
                    parent_span_id: hex_id(&raw.parent_span_id),
                    name: if raw.name.is_empty() {
                        "unknown".to_string()
                    } else {
                        raw.name.clone()
                    },
                    service: service.clone(),
                    kind: span_kind_from_wire(raw.kind),
                    status: status_from_wire(raw.status.as_ref()),
                    start_time_unix_nano: raw.start_time_unix_nano.to_string(),
                    end_time_unix_nano: raw.end_time_unix_nano.to_string(),
                    attributes: optional_attributes(attributes_from_proto(&raw.attributes)),
                    events: raw
                        .events
                        .iter()
                        .map(|event| SpanEvent {
                            time_unix_nano: event.time_unix_nano.to_string(),
                            name: event.name.clone(),
                            attributes: optional_attributes(attributes_from_proto(
                                &event.attributes,
                            )),
                        })
                        .collect(),
                    links: raw
                        .links
                        .iter()
                        .filter_map(|link| {
                            Some(SpanLink {
                                trace_id: hex_id(&link.trace_id)?,
                                span_id: hex_id(&link.span_id)?,
                                attributes: optional_attributes(attributes_from_proto(
                                    &link.attributes,
                                )),
                            })
                        })
                        .collect(),
                    resource: resource.clone(),
                    scope: scope.clone(),
                };

                if span.validate_span().is_ok() {
                    out.accepted.push(span);
                } else {
                    out.rejected += 1;
                }
            }
        }
    }

    out
}

fn normalize_logs_request(
    request: &collector::logs::v1::ExportLogsServiceRequest,
) -> Normalized<LogRecord> {
    let mut out = Normalized::new();

    for resource_logs in &request.resource_logs {
        let resource = resource_from_proto(resource_logs.resource.as_ref());

        for scope_logs in &resource_logs.scope_logs {
            let scope = scope_from_proto(scope_logs.scope.as_ref());
            let service = service_name(&resource, &scope);

            for raw in &scope_logs.log_records {
                // A zero timestamp falls back to the collector-side
                // observation time, which exporters always stamp.
                let effective_time = if raw.time_unix_nano == 0 {
                    raw.observed_time_unix_nano
                } else {
                    raw.time_unix_nano
                };

                let record = LogRecord {
                    time_unix_nano: effective_time.to_string(),
                    observed_time_unix_nano: (raw.observed_time_unix_nano != 0)
                        .then(|| raw.observed_time_unix_nano.to_string()),
                    severity_number: raw.severity_number,
                    severity_text: raw.severity_text.clone(),
                    body: raw.body.as_ref().and_then(any_value_to_canonical),
                    service: service.clone(),
                    trace_id: hex_id(&raw.trace_id),
                    span_id: hex_id(&raw.span_id),
                    attributes: optional_attributes(attributes_from_proto(&raw.attributes)),
                    resource: resource.clone(),
                    scope: scope.clone(),
                };

                if record.validate_record().is_ok() {
                    out.accepted.push(record);
                } else {
                    out.rejected += 1;
                }
            }
        }
    }

    out
}

fn number_value_from_wire(value: Option<&metrics::v1::number_data_point::Value>) -> Option<NumberValue> {
    match value? {
        metrics::v1::number_data_point::Value::AsDouble(d) => Some(NumberValue::AsDouble(*d)),
        metrics::v1::number_data_point::Value::AsInt(i) => Some(NumberValue::AsInt(i.to_string())),
    }
}

fn exemplars_from_proto(raw: &[metrics::v1::Exemplar]) -> Vec<Exemplar> {
    raw.iter()
        .filter_map(|exemplar| {
            let value = match exemplar.value.as_ref()? {
                metrics::v1::exemplar::Value::AsDouble(d) => NumberValue::AsDouble(*d),
                metrics::v1::exemplar::Value::AsInt(i) => NumberValue::AsInt(i.to_string()),
            };
            Some(Exemplar {
                time_unix_nano: exemplar.time_unix_nano.to_string(),
                value,
                trace_id: hex_id(&exemplar.trace_id),
                span_id: hex_id(&exemplar.span_id),
                filtered_attributes: optional_attributes(attributes_from_proto(
                    &exemplar.filtered_attributes,
                )),
            })
        })
        .collect()
}

fn counts_to_text(counts: &[u64]) -> Vec<String> {
    counts.iter().map(u64::to_string).collect()
}

struct PointShell {
    start_time_unix_nano: Option<String>,
    time_unix_nano: String,
    attributes: Option<AttributeList>,
    exemplars: Vec<Exemplar>,
}

fn point_shell(
    start: u64,
    time: u64,
    attributes: &[common::v1::KeyValue],
    exemplars: &[metrics::v1::Exemplar],
) -> PointShell {
    PointShell {
        start_time_unix_nano: (start != 0).then(|| start.to_string()),
        time_unix_nano: time.to_string(),
        attributes: optional_attributes(attributes_from_proto(attributes)),
        exemplars: exemplars_from_proto(exemplars),
    }
}

fn normalize_metrics_request(
    request: &collector::metrics::v1::ExportMetricsServiceRequest,
) -> Normalized<MetricPoint> {
    let mut out = Normalized::new();

    for resource_metrics in &request.resource_metrics {
        let resource = resource_from_proto(resource_metrics.resource.as_ref());

        for scope_metrics in &resource_metrics.scope_metrics {
            let scope = scope_from_proto(scope_metrics.scope.as_ref());
            let service = service_name(&resource, &scope);

            for metric in &scope_metrics.metrics {
                normalize_metric(metric, &resource, &scope, &service, &mut out);
            }
        }
    }

    out
}

fn normalize_metric(
    metric: &metrics::v1::Metric,
    resource: &ResourceDesc,
    scope: &ScopeDesc,
    service: &str,
    out: &mut Normalized<MetricPoint>,
) {
    use metrics::v1::metric::Data;

    let Some(data) = metric.data.as_ref() else {
        // A metric without a data variant carries nothing storable.
        out.rejected += 1;
        return;
    };

    let push = |shell: PointShell, data: MetricData, out: &mut Normalized<MetricPoint>| {
        let point = MetricPoint {
            name: metric.name.clone(),
            unit: (!metric.unit.is_empty()).then(|| metric.unit.clone()),
            description: (!metric.description.is_empty()).then(|| metric.description.clone()),
            service: service.to_string(),
            start_time_unix_nano: shell.start_time_unix_nano,
            time_unix_nano: shell.time_unix_nano,
            attributes: shell.attributes,
            exemplars: shell.exemplars,
            data,
            resource: resource.clone(),
            scope: scope.clone(),
        };
        if point.validate_point().is_ok() {
            out.accepted.push(point);
        } else {
            out.rejected += 1;
        }
    };

    match data {
        Data::Gauge(gauge) => {
            for dp in &gauge.data_points {
                let Some(value) = number_value_from_wire(dp.value.as_ref()) else {
                    out.rejected += 1;
                    continue;
                };
                push(
                    point_shell(dp.start_time_unix_nano, dp.time_unix_nano, &dp.attributes, &dp.exemplars),
                    MetricData::Gauge(GaugeData {
                        value,
                        flags: dp.flags,
                    }),
                    out,
                );
            }
        }
        Data::Sum(sum) => {
            for dp in &sum.data_points {
                let Some(value) = number_value_from_wire(dp.value.as_ref()) else {
                    out.rejected += 1;
                    continue;
                };
                push(
                    point_shell(dp.start_time_unix_nano, dp.time_unix_nano, &dp.attributes, &dp.exemplars),
                    MetricData::Sum(SumData {
                        value,
                        monotonic: sum.is_monotonic,
                        flags: dp.flags,
                    }),
                    out,
                );
            }
        }
        Data::Histogram(histogram) => {
            for dp in &histogram.data_points {
                push(
                    point_shell(dp.start_time_unix_nano, dp.time_unix_nano, &dp.attributes, &dp.exemplars),
                    MetricData::Histogram(HistogramData {
                        count: dp.count.to_string(),
                        sum: dp.sum,
                        min: dp.min,
                        max: dp.max,
                        bucket_counts: counts_to_text(&dp.bucket_counts),
                        explicit_bounds: dp.explicit_bounds.clone(),
                        flags: dp.flags,
                    }),
                    out,
                );
            }
        }
        Data::ExponentialHistogram(histogram) => {
            for dp in &histogram.data_points {
                let buckets = |raw: Option<&metrics::v1::exponential_histogram_data_point::Buckets>| {
                    raw.map(|b| ExponentialBuckets {
                        offset: b.offset,
                        bucket_counts: counts_to_text(&b.bucket_counts),
                    })
                    .unwrap_or_default()
                };
                push(
                    point_shell(dp.start_time_unix_nano, dp.time_unix_nano, &dp.attributes, &dp.exemplars),
                    MetricData::ExponentialHistogram(ExponentialHistogramData {
                        count: dp.count.to_string(),
                        sum: dp.sum,
                        min: dp.min,
                        max: dp.max,
                        scale: dp.scale,
                        zero_count: dp.zero_count.to_string(),
                        zero_threshold: dp.zero_threshold,
                        positive: buckets(dp.positive.as_ref()),
                        negative: buckets(dp.negative.as_ref()),
                        flags: dp.flags,
                    }),
                    out,
                );
            }
        }
        Data::Summary(summary) => {
            for dp in &summary.data_points {
                // Summaries carry no exemplars on the wire.
                push(
                    point_shell(dp.start_time_unix_nano, dp.time_unix_nano, &dp.attributes, &[]),
                    MetricData::Summary(SummaryData {
                        count: dp.count.to_string(),
                        sum: dp.sum,
                        quantile_values: dp
                            .quantile_values
                            .iter()
                            .map(|q| QuantileValue {
                                quantile: q.quantile,
                                value: q.value,
                            })
                            .collect(),
                        flags: dp.flags,
                    }),
                    out,
                );
            }
        }
    }
}

// ---- JSON text format ------------------------------------------------------

/// Mirror structs for the OTLP JSON request shapes.
///
/// Structural schema validation of the text format belongs to the external
/// HTTP collaborator; this module applies the same value normalization as
/// the binary path (hex ids lowercased, nano fields accepted as string or
/// number, absent attribute sets collapsed to `None`).
mod json {
    use super::{optional_attributes, service_name, LogRecord, MetricPoint, Normalized, Span};
    use crate::models::metric::{
        Exemplar, ExponentialBuckets, ExponentialHistogramData, GaugeData, HistogramData,
        MetricData, NumberValue, QuantileValue, SumData, SummaryData,
    };
    use crate::models::value::{AttributeList, CanonicalValue, KeyValuePair, ResourceDesc, ScopeDesc};
    use crate::models::{SpanEvent, SpanLink, SpanStatus, StatusCode};
    use serde::{Deserialize, Deserializer};

    fn de_nano_text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s,
            Repr::Unsigned(n) => n.to_string(),
            Repr::Signed(n) => n.to_string(),
        })
    }

    fn de_opt_nano_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        de_nano_text(deserializer).map(Some)
    }

    fn de_nano_text_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Unsigned(u64),
        }
        let raw = Vec::<Repr>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|entry| match entry {
                Repr::Text(s) => s,
                Repr::Unsigned(n) => n.to_string(),
            })
            .collect())
    }

    fn zero_text() -> String {
        "0".to_string()
    }

    fn attrs(pairs: Vec<KeyValuePair>) -> Option<AttributeList> {
        optional_attributes(AttributeList::from_pairs(pairs))
    }

    fn id(raw: String) -> Option<String> {
        if raw.is_empty() {
            None
        } else {
            Some(raw.to_ascii_lowercase())
        }
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct TracesRequest {
        #[serde(default)]
        resource_spans: Vec<ResourceSpans>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ResourceSpans {
        #[serde(default)]
        resource: Option<ResourceJson>,
        #[serde(default)]
        scope_spans: Vec<ScopeSpans>,
    }

    #[derive(Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    struct ResourceJson {
        #[serde(default)]
        attributes: Vec<KeyValuePair>,
        #[serde(default)]
        dropped_attributes_count: u32,
    }

    impl ResourceJson {
        fn into_desc(self) -> ResourceDesc {
            ResourceDesc {
                attributes: AttributeList::from_pairs(self.attributes),
                dropped_attributes_count: self.dropped_attributes_count,
            }
        }
    }

    #[derive(Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    struct ScopeJson {
        #[serde(default)]
        name: String,
        #[serde(default)]
        version: String,
        #[serde(default)]
        attributes: Vec<KeyValuePair>,
        #[serde(default)]
        dropped_attributes_count: u32,
    }

    impl ScopeJson {
        fn into_desc(self) -> ScopeDesc {
            ScopeDesc {
                name: self.name,
                version: self.version,
                attributes: AttributeList::from_pairs(self.attributes),
                dropped_attributes_count: self.dropped_attributes_count,
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ScopeSpans {
        #[serde(default)]
        scope: Option<ScopeJson>,
        #[serde(default)]
        spans: Vec<SpanJson>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SpanJson {
        #[serde(default)]
        trace_id: String,
        #[serde(default)]
        span_id: String,
        #[serde(default)]
        parent_span_id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        kind: i32,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        start_time_unix_nano: String,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        end_time_unix_nano: String,
        #[serde(default)]
        attributes: Vec<KeyValuePair>,
        #[serde(default)]
        events: Vec<EventJson>,
        #[serde(default)]
        links: Vec<LinkJson>,
        #[serde(default)]
        status: Option<StatusJson>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct EventJson {
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        time_unix_nano: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        attributes: Vec<KeyValuePair>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct LinkJson {
        #[serde(default)]
        trace_id: String,
        #[serde(default)]
        span_id: String,
        #[serde(default)]
        attributes: Vec<KeyValuePair>,
    }

    #[derive(Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    struct StatusJson {
        #[serde(default)]
        message: String,
        #[serde(default)]
        code: i32,
    }

    pub(super) fn normalize_traces(request: TracesRequest) -> Normalized<Span> {
        let mut out = Normalized::new();

        for resource_spans in request.resource_spans {
            let resource = resource_spans
                .resource
                .map(ResourceJson::into_desc)
                .unwrap_or_default();

            for scope_spans in resource_spans.scope_spans {
                let scope = scope_spans
                    .scope
                    .map(ScopeJson::into_desc)
                    .unwrap_or_default();
                let service = service_name(&resource, &scope);

                for raw in scope_spans.spans {
                    let (Some(trace_id), Some(span_id)) =
                        (id(raw.trace_id), id(raw.span_id))
                    else {
                        out.rejected += 1;
                        continue;
                    };

                    let span = Span {
                        trace_id,
                        span_id,
                        parent_span_id: id(raw.parent_span_id),
                        name: if raw.name.is_empty() {
                            "unknown".to_string()
                        } else {
                            raw.name
                        },
                        service: service.clone(),
                        kind: super::span_kind_from_wire(raw.kind),
                        status: raw
                            .status
                            .map(|s| SpanStatus {
                                code: match s.code {
                                    1 => StatusCode::Ok,
                                    2 => StatusCode::Error,
                                    _ => StatusCode::Unset,
                                },
                                message: s.message,
                            })
                            .unwrap_or_default(),
                        start_time_unix_nano: raw.start_time_unix_nano,
                        end_time_unix_nano: raw.end_time_unix_nano,
                        attributes: attrs(raw.attributes),
                        events: raw
                            .events
                            .into_iter()
                            .map(|event| SpanEvent {
                                time_unix_nano: event.time_unix_nano,
                                name: event.name,
                                attributes: attrs(event.attributes),
                            })
                            .collect(),
                        links: raw
                            .links
                            .into_iter()
                            .filter_map(|link| {
                                Some(SpanLink {
                                    trace_id: id(link.trace_id)?,
                                    span_id: id(link.span_id)?,
                                    attributes: attrs(link.attributes),
                                })
                            })
                            .collect(),
                        resource: resource.clone(),
                        scope: scope.clone(),
                    };

                    if span.validate_span().is_ok() {
                        out.accepted.push(span);
                    } else {
                        out.rejected += 1;
                    }
                }
            }
        }

        out
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct LogsRequest {
        #[serde(default)]
        resource_logs: Vec<ResourceLogs>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ResourceLogs {
        #[serde(default)]
        resource: Option<ResourceJson>,
        #[serde(default)]
        scope_logs: Vec<ScopeLogs>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ScopeLogs {
        #[serde(default)]
        scope: Option<ScopeJson>,
        #[serde(default)]
        log_records: Vec<LogRecordJson>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct LogRecordJson {
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        time_unix_nano: String,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        observed_time_unix_nano: String,
        #[serde(default)]
        severity_number: i32,
        #[serde(default)]
        severity_text: String,
        #[serde(default)]
        body: Option<CanonicalValue>,
        #[serde(default)]
        trace_id: String,
        #[serde(default)]
        span_id: String,
        #[serde(default)]
        attributes: Vec<KeyValuePair>,
    }

    pub(super) fn normalize_logs(request: LogsRequest) -> Normalized<LogRecord> {
        let mut out = Normalized::new();

        for resource_logs in request.resource_logs {
            let resource = resource_logs
                .resource
                .map(ResourceJson::into_desc)
                .unwrap_or_default();

            for scope_logs in resource_logs.scope_logs {
                let scope = scope_logs
                    .scope
                    .map(ScopeJson::into_desc)
                    .unwrap_or_default();
                let service = service_name(&resource, &scope);

                for raw in scope_logs.log_records {
                    let effective_time = if raw.time_unix_nano == "0" {
                        raw.observed_time_unix_nano.clone()
                    } else {
                        raw.time_unix_nano.clone()
                    };

                    let record = LogRecord {
                        time_unix_nano: effective_time,
                        observed_time_unix_nano: (raw.observed_time_unix_nano != "0")
                            .then_some(raw.observed_time_unix_nano),
                        severity_number: raw.severity_number,
                        severity_text: raw.severity_text,
                        body: raw.body,
                        service: service.clone(),
                        trace_id: id(raw.trace_id),
                        span_id: id(raw.span_id),
                        attributes: attrs(raw.attributes),
                        resource: resource.clone(),
                        scope: scope.clone(),
                    };

                    if record.validate_record().is_ok() {
                        out.accepted.push(record);
                    } else {
                        out.rejected += 1;
                    }
                }
            }
        }

        out
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct MetricsRequest {
        #[serde(default)]
        resource_metrics: Vec<ResourceMetrics>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ResourceMetrics {
        #[serde(default)]
        resource: Option<ResourceJson>,
        #[serde(default)]
        scope_metrics: Vec<ScopeMetrics>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ScopeMetrics {
        #[serde(default)]
        scope: Option<ScopeJson>,
        #[serde(default)]
        metrics: Vec<MetricJson>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct MetricJson {
        #[serde(default)]
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        unit: String,
        #[serde(default)]
        gauge: Option<NumberPoints>,
        #[serde(default)]
        sum: Option<SumJson>,
        #[serde(default)]
        histogram: Option<HistogramJson>,
        #[serde(default)]
        exponential_histogram: Option<ExponentialHistogramJson>,
        #[serde(default)]
        summary: Option<SummaryJson>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct NumberPoints {
        #[serde(default)]
        data_points: Vec<NumberDataPointJson>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SumJson {
        #[serde(default)]
        data_points: Vec<NumberDataPointJson>,
        #[serde(default)]
        is_monotonic: bool,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct HistogramJson {
        #[serde(default)]
        data_points: Vec<HistogramDataPointJson>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ExponentialHistogramJson {
        #[serde(default)]
        data_points: Vec<ExponentialDataPointJson>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SummaryJson {
        #[serde(default)]
        data_points: Vec<SummaryDataPointJson>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct NumberDataPointJson {
        #[serde(default)]
        attributes: Vec<KeyValuePair>,
        #[serde(default, deserialize_with = "de_opt_nano_text")]
        start_time_unix_nano: Option<String>,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        time_unix_nano: String,
        #[serde(default)]
        as_double: Option<f64>,
        #[serde(default, deserialize_with = "de_opt_nano_text")]
        as_int: Option<String>,
        #[serde(default)]
        exemplars: Vec<ExemplarJson>,
        #[serde(default)]
        flags: u32,
    }

    impl NumberDataPointJson {
        fn number_value(&self) -> Option<NumberValue> {
            if let Some(i) = &self.as_int {
                Some(NumberValue::AsInt(i.clone()))
            } else {
                self.as_double.map(NumberValue::AsDouble)
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct HistogramDataPointJson {
        #[serde(default)]
        attributes: Vec<KeyValuePair>,
        #[serde(default, deserialize_with = "de_opt_nano_text")]
        start_time_unix_nano: Option<String>,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        time_unix_nano: String,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        count: String,
        #[serde(default)]
        sum: Option<f64>,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default, deserialize_with = "de_nano_text_vec")]
        bucket_counts: Vec<String>,
        #[serde(default)]
        explicit_bounds: Vec<f64>,
        #[serde(default)]
        exemplars: Vec<ExemplarJson>,
        #[serde(default)]
        flags: u32,
    }

    #[derive(Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    struct BucketsJson {
        #[serde(default)]
        offset: i32,
        #[serde(default, deserialize_with = "de_nano_text_vec")]
        bucket_counts: Vec<String>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ExponentialDataPointJson {
        #[serde(default)]
        attributes: Vec<KeyValuePair>,
        #[serde(default, deserialize_with = "de_opt_nano_text")]
        start_time_unix_nano: Option<String>,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        time_unix_nano: String,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        count: String,
        #[serde(default)]
        sum: Option<f64>,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        scale: i32,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        zero_count: String,
        #[serde(default)]
        zero_threshold: f64,
        #[serde(default)]
        positive: BucketsJson,
        #[serde(default)]
        negative: BucketsJson,
        #[serde(default)]
        exemplars: Vec<ExemplarJson>,
        #[serde(default)]
        flags: u32,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SummaryDataPointJson {
        #[serde(default)]
        attributes: Vec<KeyValuePair>,
        #[serde(default, deserialize_with = "de_opt_nano_text")]
        start_time_unix_nano: Option<String>,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        time_unix_nano: String,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        count: String,
        #[serde(default)]
        sum: f64,
        #[serde(default)]
        quantile_values: Vec<QuantileJson>,
        #[serde(default)]
        flags: u32,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct QuantileJson {
        #[serde(default)]
        quantile: f64,
        #[serde(default)]
        value: f64,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ExemplarJson {
        #[serde(default)]
        filtered_attributes: Vec<KeyValuePair>,
        #[serde(default = "zero_text", deserialize_with = "de_nano_text")]
        time_unix_nano: String,
        #[serde(default)]
        as_double: Option<f64>,
        #[serde(default, deserialize_with = "de_opt_nano_text")]
        as_int: Option<String>,
        #[serde(default)]
        trace_id: String,
        #[serde(default)]
        span_id: String,
    }

    fn exemplars(raw: Vec<ExemplarJson>) -> Vec<Exemplar> {
        raw.into_iter()
            .filter_map(|exemplar| {
                let value = if let Some(i) = exemplar.as_int {
                    NumberValue::AsInt(i)
                } else {
                    NumberValue::AsDouble(exemplar.as_double?)
                };
                Some(Exemplar {
                    time_unix_nano: exemplar.time_unix_nano,
                    value,
                    trace_id: id(exemplar.trace_id),
                    span_id: id(exemplar.span_id),
                    filtered_attributes: attrs(exemplar.filtered_attributes),
                })
            })
            .collect()
    }

    pub(super) fn normalize_metrics(request: MetricsRequest) -> Normalized<MetricPoint> {
        let mut out = Normalized::new();

        for resource_metrics in request.resource_metrics {
            let resource = resource_metrics
                .resource
                .map(ResourceJson::into_desc)
                .unwrap_or_default();

            for scope_metrics in resource_metrics.scope_metrics {
                let scope = scope_metrics
                    .scope
                    .map(ScopeJson::into_desc)
                    .unwrap_or_default();
                let service = service_name(&resource, &scope);

                for metric in scope_metrics.metrics {
                    normalize_metric_json(metric, &resource, &scope, &service, &mut out);
                }
            }
        }

        out
    }

    fn normalize_metric_json(
        metric: MetricJson,
        resource: &ResourceDesc,
        scope: &ScopeDesc,
        service: &str,
        out: &mut Normalized<MetricPoint>,
    ) {
        let name = metric.name;
        let unit = (!metric.unit.is_empty()).then_some(metric.unit);
        let description = (!metric.description.is_empty()).then_some(metric.description);

        let push = |start: Option<String>,
                        time: String,
                        attributes: Vec<KeyValuePair>,
                        point_exemplars: Vec<ExemplarJson>,
                        data: MetricData,
                        out: &mut Normalized<MetricPoint>| {
            let point = MetricPoint {
                name: name.clone(),
                unit: unit.clone(),
                description: description.clone(),
                service: service.to_string(),
                start_time_unix_nano: start.filter(|s| s != "0"),
                time_unix_nano: time,
                attributes: attrs(attributes),
                exemplars: exemplars(point_exemplars),
                data,
                resource: resource.clone(),
                scope: scope.clone(),
            };
            if point.validate_point().is_ok() {
                out.accepted.push(point);
            } else {
                out.rejected += 1;
            }
        };

        if let Some(gauge) = metric.gauge {
            for dp in gauge.data_points {
                let Some(value) = dp.number_value() else {
                    out.rejected += 1;
                    continue;
                };
                push(
                    dp.start_time_unix_nano,
                    dp.time_unix_nano,
                    dp.attributes,
                    dp.exemplars,
                    MetricData::Gauge(GaugeData {
                        value,
                        flags: dp.flags,
                    }),
                    out,
                );
            }
        } else if let Some(sum) = metric.sum {
            let monotonic = sum.is_monotonic;
            for dp in sum.data_points {
                let Some(value) = dp.number_value() else {
                    out.rejected += 1;
                    continue;
                };
                push(
                    dp.start_time_unix_nano,
                    dp.time_unix_nano,
                    dp.attributes,
                    dp.exemplars,
                    MetricData::Sum(SumData {
                        value,
                        monotonic,
                        flags: dp.flags,
                    }),
                    out,
                );
            }
        } else if let Some(histogram) = metric.histogram {
            for dp in histogram.data_points {
                push(
                    dp.start_time_unix_nano,
                    dp.time_unix_nano,
                    dp.attributes,
                    dp.exemplars,
                    MetricData::Histogram(HistogramData {
                        count: dp.count,
                        sum: dp.sum,
                        min: dp.min,
                        max: dp.max,
                        bucket_counts: dp.bucket_counts,
                        explicit_bounds: dp.explicit_bounds,
                        flags: dp.flags,
                    }),
                    out,
                );
            }
        } else if let Some(histogram) = metric.exponential_histogram {
            for dp in histogram.data_points {
                push(
                    dp.start_time_unix_nano,
                    dp.time_unix_nano,
                    dp.attributes,
                    dp.exemplars,
                    MetricData::ExponentialHistogram(ExponentialHistogramData {
                        count: dp.count,
                        sum: dp.sum,
                        min: dp.min,
                        max: dp.max,
                        scale: dp.scale,
                        zero_count: dp.zero_count,
                        zero_threshold: dp.zero_threshold,
                        positive: ExponentialBuckets {
                            offset: dp.positive.offset,
                            bucket_counts: dp.positive.bucket_counts,
                        },
                        negative: ExponentialBuckets {
                            offset: dp.negative.offset,
                            bucket_counts: dp.negative.bucket_counts,
                        },
                        flags: dp.flags,
                    }),
                    out,
                );
            }
        } else if let Some(summary) = metric.summary {
            for dp in summary.data_points {
                push(
                    dp.start_time_unix_nano,
                    dp.time_unix_nano,
                    dp.attributes,
                    Vec::new(),
                    MetricData::Summary(SummaryData {
                        count: dp.count,
                        sum: dp.sum,
                        quantile_values: dp
                            .quantile_values
                            .into_iter()
                            .map(|q| QuantileValue {
                                quantile: q.quantile,
                                value: q.value,
                            })
                            .collect(),
                        flags: dp.flags,
                    }),
                    out,
                );
            }
        } else {
            out.rejected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricKind;

    fn sample_trace_request() -> collector::trace::v1::ExportTraceServiceRequest {
        collector::trace::v1::ExportTraceServiceRequest {
            resource_spans: vec![trace::v1::ResourceSpans {
                resource: Some(resource::v1::Resource {
                    attributes: vec![common::v1::KeyValue {
                        key: "service.name".to_string(),
                        value: Some(common::v1::AnyValue {
                            value: Some(common::v1::any_value::Value::StringValue(
                                "checkout".to_string(),
                            )),
                        }),
                    }],
                    dropped_attributes_count: 0,
                }),
                scope_spans: vec![trace::v1::ScopeSpans {
                    scope: Some(common::v1::InstrumentationScope {
                        name: "sdk".to_string(),
                        ..Default::default()
                    }),
                    spans: vec![trace::v1::Span {
                        trace_id: vec![
                            0x0a, 0xf7, 0x65, 0x19, 0x16, 0xcd, 0x43, 0xdd, 0x84, 0x48, 0xeb,
                            0x21, 0x1c, 0x80, 0x31, 0x9c,
                        ],
                        span_id: vec![0xb7, 0xad, 0x6b, 0x71, 0x69, 0x20, 0x33, 0x31],
                        name: "GET /cart".to_string(),
                        kind: trace::v1::span::span_kind::SERVER,
                        start_time_unix_nano: 1_704_067_200_123_456_789,
                        end_time_unix_nano: 1_704_067_200_123_456_989,
                        attributes: vec![common::v1::KeyValue {
                            key: "http.status_code".to_string(),
                            value: Some(common::v1::AnyValue {
                                value: Some(common::v1::any_value::Value::IntValue(200)),
                            }),
                        }],
                        status: Some(trace::v1::Status {
                            message: String::new(),
                            code: 1,
                        }),
                        ..Default::default()
                    }],
                    schema_url: String::new(),
                }],
                schema_url: String::new(),
            }],
        }
    }

    #[test]
    fn test_decode_trace_protobuf() {
        let bytes = sample_trace_request().encode_to_vec();
        let request = decode(SignalKind::Traces, WireFormat::Protobuf, &bytes).unwrap();

        let CanonicalRequest::Traces(normalized) = request else {
            panic!("wrong signal");
        };
        assert_eq!(normalized.rejected, 0);
        assert_eq!(normalized.accepted.len(), 1);

        let span = &normalized.accepted[0];
        assert_eq!(span.trace_id, "0af7651916cd43dd8448eb211c80319c");
        assert_eq!(span.span_id, "b7ad6b7169203331");
        assert_eq!(span.service, "checkout");
        assert_eq!(span.kind, SpanKind::Server);
        assert_eq!(span.status.code, StatusCode::Ok);
        assert_eq!(span.start_time_unix_nano, "1704067200123456789");
        assert_eq!(
            span.attributes.as_ref().unwrap().get("http.status_code"),
            Some(&CanonicalValue::Int("200".to_string()))
        );
    }

    #[test]
    fn test_decode_is_pure() {
        let bytes = sample_trace_request().encode_to_vec();
        let first = decode(SignalKind::Traces, WireFormat::Protobuf, &bytes).unwrap();
        let second = decode(SignalKind::Traces, WireFormat::Protobuf, &bytes).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_rejects_span_without_ids() {
        let mut request = sample_trace_request();
        request.resource_spans[0].scope_spans[0].spans[0].span_id = Vec::new();
        let bytes = request.encode_to_vec();

        let CanonicalRequest::Traces(normalized) =
            decode(SignalKind::Traces, WireFormat::Protobuf, &bytes).unwrap()
        else {
            panic!("wrong signal");
        };
        assert_eq!(normalized.accepted.len(), 0);
        assert_eq!(normalized.rejected, 1);
    }

    #[test]
    fn test_decode_malformed_bytes() {
        let result = decode(SignalKind::Traces, WireFormat::Protobuf, &[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(EngineError::Decode(_))));
    }

    #[test]
    fn test_decode_log_protobuf_uses_observed_time_fallback() {
        let request = collector::logs::v1::ExportLogsServiceRequest {
            resource_logs: vec![logs::v1::ResourceLogs {
                resource: None,
                scope_logs: vec![logs::v1::ScopeLogs {
                    scope: None,
                    log_records: vec![logs::v1::LogRecord {
                        time_unix_nano: 0,
                        observed_time_unix_nano: 1_700_000_000_000_000_000,
                        severity_number: 17,
                        severity_text: "ERROR".to_string(),
                        body: Some(common::v1::AnyValue {
                            value: Some(common::v1::any_value::Value::StringValue(
                                "disk full".to_string(),
                            )),
                        }),
                        ..Default::default()
                    }],
                    schema_url: String::new(),
                }],
                schema_url: String::new(),
            }],
        };
        let bytes = request.encode_to_vec();

        let CanonicalRequest::Logs(normalized) =
            decode(SignalKind::Logs, WireFormat::Protobuf, &bytes).unwrap()
        else {
            panic!("wrong signal");
        };
        let record = &normalized.accepted[0];
        assert_eq!(record.time_unix_nano, "1700000000000000000");
        assert_eq!(record.service, "unknown");
        assert_eq!(record.body_text(), "disk full");
    }

    #[test]
    fn test_decode_metrics_protobuf_all_kinds() {
        use metrics::v1 as pb;

        let number_point = pb::NumberDataPoint {
            time_unix_nano: 1_700_000_000_000_000_000,
            value: Some(pb::number_data_point::Value::AsInt(42)),
            ..Default::default()
        };
        let request = collector::metrics::v1::ExportMetricsServiceRequest {
            resource_metrics: vec![pb::ResourceMetrics {
                resource: None,
                scope_metrics: vec![pb::ScopeMetrics {
                    scope: None,
                    metrics: vec![
                        pb::Metric {
                            name: "queue.depth".to_string(),
                            data: Some(pb::metric::Data::Gauge(pb::Gauge {
                                data_points: vec![number_point.clone()],
                            })),
                            ..Default::default()
                        },
                        pb::Metric {
                            name: "requests.total".to_string(),
                            data: Some(pb::metric::Data::Sum(pb::Sum {
                                data_points: vec![number_point],
                                aggregation_temporality: 2,
                                is_monotonic: true,
                            })),
                            ..Default::default()
                        },
                        pb::Metric {
                            name: "latency".to_string(),
                            data: Some(pb::metric::Data::Histogram(pb::Histogram {
                                data_points: vec![pb::HistogramDataPoint {
                                    time_unix_nano: 1,
                                    count: 7,
                                    sum: Some(3.5),
                                    bucket_counts: vec![3, 4],
                                    explicit_bounds: vec![0.5],
                                    ..Default::default()
                                }],
                                aggregation_temporality: 2,
                            })),
                            ..Default::default()
                        },
                        pb::Metric {
                            name: "latency.exp".to_string(),
                            data: Some(pb::metric::Data::ExponentialHistogram(
                                pb::ExponentialHistogram {
                                    data_points: vec![pb::ExponentialHistogramDataPoint {
                                        time_unix_nano: 1,
                                        count: 2,
                                        scale: 3,
                                        zero_count: 1,
                                        positive: Some(
                                            pb::exponential_histogram_data_point::Buckets {
                                                offset: -2,
                                                bucket_counts: vec![1, 1],
                                            },
                                        ),
                                        ..Default::default()
                                    }],
                                    aggregation_temporality: 2,
                                },
                            )),
                            ..Default::default()
                        },
                        pb::Metric {
                            name: "gc.pause".to_string(),
                            data: Some(pb::metric::Data::Summary(pb::Summary {
                                data_points: vec![pb::SummaryDataPoint {
                                    time_unix_nano: 1,
                                    count: 10,
                                    sum: 0.9,
                                    quantile_values: vec![
                                        pb::summary_data_point::ValueAtQuantile {
                                            quantile: 0.99,
                                            value: 0.2,
                                        },
                                    ],
                                    ..Default::default()
                                }],
                            })),
                            ..Default::default()
                        },
                    ],
                    schema_url: String::new(),
                }],
                schema_url: String::new(),
            }],
        };
        let bytes = request.encode_to_vec();

        let CanonicalRequest::Metrics(normalized) =
            decode(SignalKind::Metrics, WireFormat::Protobuf, &bytes).unwrap()
        else {
            panic!("wrong signal");
        };
        assert_eq!(normalized.rejected, 0);
        let kinds: Vec<MetricKind> =
            normalized.accepted.iter().map(MetricPoint::kind).collect();
        assert_eq!(
            kinds,
            vec![
                MetricKind::Gauge,
                MetricKind::Sum,
                MetricKind::Histogram,
                MetricKind::ExponentialHistogram,
                MetricKind::Summary,
            ]
        );

        // 64-bit wire integers arrive as decimal strings.
        let MetricData::Sum(sum) = &normalized.accepted[1].data else {
            panic!("expected sum");
        };
        assert_eq!(sum.value, NumberValue::AsInt("42".to_string()));
        assert!(sum.monotonic);

        let MetricData::Histogram(histogram) = &normalized.accepted[2].data else {
            panic!("expected histogram");
        };
        assert_eq!(histogram.count, "7");
        assert_eq!(histogram.bucket_counts, vec!["3", "4"]);
    }

    #[test]
    fn test_decode_metrics_rejects_valueless_point() {
        use metrics::v1 as pb;

        let request = collector::metrics::v1::ExportMetricsServiceRequest {
            resource_metrics: vec![pb::ResourceMetrics {
                resource: None,
                scope_metrics: vec![pb::ScopeMetrics {
                    scope: None,
                    metrics: vec![pb::Metric {
                        name: "half.empty".to_string(),
                        data: Some(pb::metric::Data::Gauge(pb::Gauge {
                            data_points: vec![
                                pb::NumberDataPoint {
                                    time_unix_nano: 1,
                                    value: None,
                                    ..Default::default()
                                },
                                pb::NumberDataPoint {
                                    time_unix_nano: 2,
                                    value: Some(pb::number_data_point::Value::AsDouble(1.0)),
                                    ..Default::default()
                                },
                            ],
                        })),
                        ..Default::default()
                    }],
                    schema_url: String::new(),
                }],
                schema_url: String::new(),
            }],
        };
        let bytes = request.encode_to_vec();

        let CanonicalRequest::Metrics(normalized) =
            decode(SignalKind::Metrics, WireFormat::Protobuf, &bytes).unwrap()
        else {
            panic!("wrong signal");
        };
        assert_eq!(normalized.accepted.len(), 1);
        assert_eq!(normalized.rejected, 1);
        assert_eq!(normalized.partial_success().rejected, 1);
    }

    #[test]
    fn test_decode_traces_json() {
        let body = r#"{
            "resourceSpans": [{
                "resource": {
                    "attributes": [
                        {"key": "service.name", "value": {"stringValue": "billing"}}
                    ]
                },
                "scopeSpans": [{
                    "scope": {"name": "sdk"},
                    "spans": [{
                        "traceId": "0AF7651916CD43DD8448EB211C80319C",
                        "spanId": "B7AD6B7169203331",
                        "name": "charge",
                        "kind": 3,
                        "startTimeUnixNano": "1700000000000000000",
                        "endTimeUnixNano": 1700000000000000512,
                        "attributes": [
                            {"key": "amount", "value": {"intValue": "1999"}}
                        ]
                    }]
                }]
            }]
        }"#;

        let CanonicalRequest::Traces(normalized) =
            decode(SignalKind::Traces, WireFormat::Json, body.as_bytes()).unwrap()
        else {
            panic!("wrong signal");
        };
        assert_eq!(normalized.rejected, 0);

        let span = &normalized.accepted[0];
        // Ids normalize to lowercase hex.
        assert_eq!(span.trace_id, "0af7651916cd43dd8448eb211c80319c");
        assert_eq!(span.kind, SpanKind::Client);
        assert_eq!(span.service, "billing");
        assert_eq!(span.end_time_unix_nano, "1700000000000000512");
        assert_eq!(
            span.attributes.as_ref().unwrap().get("amount"),
            Some(&CanonicalValue::Int("1999".to_string()))
        );
    }

    #[test]
    fn test_decode_json_malformed() {
        let result = decode(SignalKind::Logs, WireFormat::Json, b"{not json");
        assert!(matches!(result, Err(EngineError::Decode(_))));
    }

    #[test]
    fn test_empty_attribute_sets_are_absent() {
        let bytes = collector::trace::v1::ExportTraceServiceRequest {
            resource_spans: vec![trace::v1::ResourceSpans {
                resource: None,
                scope_spans: vec![trace::v1::ScopeSpans {
                    scope: None,
                    spans: vec![trace::v1::Span {
                        trace_id: vec![1; 16],
                        span_id: vec![2; 8],
                        name: "bare".to_string(),
                        ..Default::default()
                    }],
                    schema_url: String::new(),
                }],
                schema_url: String::new(),
            }],
        }
        .encode_to_vec();

        let CanonicalRequest::Traces(normalized) =
            decode(SignalKind::Traces, WireFormat::Protobuf, &bytes).unwrap()
        else {
            panic!("wrong signal");
        };
        assert_eq!(normalized.accepted[0].attributes, None);
    }
}
