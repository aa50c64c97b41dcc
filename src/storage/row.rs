//! Row types for the ClickHouse engine.
//!
//! Write rows carry native column types (i64 nanoseconds into
//! `DateTime64(9)` columns, stringified attribute maps); read rows carry
//! the `toString` projections and re-type everything through the coercion
//! layer. Field order matches the projections in
//! [`crate::query::translate`] column for column. The five metric kinds
//! each get their own pair of row structs; the column sets are written out
//! explicitly so they can be checked against the DDL side by side.
//!
//! A row that fails to decode is schema drift or a write-path defect: the
//! offending context is logged here and a generic
//! [`EngineError::StorageRowParse`] goes to the caller.

use crate::coerce::{
    coerce_attributes_array, coerce_to_attribute_list, coerce_u64_array, coerced_to_canonical,
    native_to_nanos,
};
use crate::error::EngineError;
use crate::models::metric::{
    Exemplar, ExponentialBuckets, ExponentialHistogramData, GaugeData, HistogramData, MetricData,
    MetricPoint, NumberValue, QuantileValue, SumData, SummaryData,
};
use crate::models::trace::parse_storable_nanos;
use crate::models::value::{AttributeList, KeyValuePair, ResourceDesc, ScopeDesc};
use crate::models::{LogRecord, Span, SpanEvent, SpanLink, SpanStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn nanos_to_i64(nanos: &str) -> i64 {
    parse_storable_nanos(nanos).unwrap_or(0)
}

fn storage_map(attributes: Option<&AttributeList>) -> BTreeMap<String, String> {
    attributes.map(AttributeList::storage_map).unwrap_or_default()
}

fn resource_from_map(map: &BTreeMap<String, String>) -> ResourceDesc {
    ResourceDesc {
        attributes: coerce_to_attribute_list(map).unwrap_or_default(),
        dropped_attributes_count: 0,
    }
}

fn read_nanos(native: &str, context: &str) -> Result<String, EngineError> {
    native_to_nanos(native).map_err(|e| {
        tracing::error!(column = context, value = native, error = %e, "bad stored timestamp");
        EngineError::StorageRowParse("stored row has an invalid timestamp".to_string())
    })
}

/// Serialized form of a span event inside the `events` text column.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEvent {
    time_unix_nano: String,
    name: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

/// Serialized form of a span link inside the `links` text column.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLink {
    trace_id: String,
    span_id: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

fn events_to_text(events: &[SpanEvent]) -> String {
    let stored: Vec<StoredEvent> = events
        .iter()
        .map(|event| StoredEvent {
            time_unix_nano: event.time_unix_nano.clone(),
            name: event.name.clone(),
            attributes: storage_map(event.attributes.as_ref()),
        })
        .collect();
    serde_json::to_string(&stored).unwrap_or_else(|_| "[]".to_string())
}

fn links_to_text(links: &[SpanLink]) -> String {
    let stored: Vec<StoredLink> = links
        .iter()
        .map(|link| StoredLink {
            trace_id: link.trace_id.clone(),
            span_id: link.span_id.clone(),
            attributes: storage_map(link.attributes.as_ref()),
        })
        .collect();
    serde_json::to_string(&stored).unwrap_or_else(|_| "[]".to_string())
}

/// Re-types stored events: parse the array, then coerce the attribute maps
/// element-wise back into typed values.
fn events_from_text(text: &str) -> Result<Vec<SpanEvent>, EngineError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let stored: Vec<StoredEvent> = serde_json::from_str(text).map_err(|e| {
        tracing::error!(error = %e, "bad stored events column");
        EngineError::StorageRowParse("stored row has an invalid events column".to_string())
    })?;

    let maps: Vec<BTreeMap<String, String>> =
        stored.iter().map(|event| event.attributes.clone()).collect();
    let coerced = coerce_attributes_array(&maps).unwrap_or_default();

    Ok(stored
        .into_iter()
        .zip(coerced.into_iter().chain(std::iter::repeat(None)))
        .map(|(event, attributes)| SpanEvent {
            time_unix_nano: event.time_unix_nano,
            name: event.name,
            attributes: attributes.map(typed_map_to_list),
        })
        .collect())
}

fn links_from_text(text: &str) -> Result<Vec<SpanLink>, EngineError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let stored: Vec<StoredLink> = serde_json::from_str(text).map_err(|e| {
        tracing::error!(error = %e, "bad stored links column");
        EngineError::StorageRowParse("stored row has an invalid links column".to_string())
    })?;

    let maps: Vec<BTreeMap<String, String>> =
        stored.iter().map(|link| link.attributes.clone()).collect();
    let coerced = coerce_attributes_array(&maps).unwrap_or_default();

    Ok(stored
        .into_iter()
        .zip(coerced.into_iter().chain(std::iter::repeat(None)))
        .map(|(link, attributes)| SpanLink {
            trace_id: link.trace_id,
            span_id: link.span_id,
            attributes: attributes.map(typed_map_to_list),
        })
        .collect())
}

fn typed_map_to_list(typed: BTreeMap<String, serde_json::Value>) -> AttributeList {
    AttributeList::from_pairs(
        typed
            .iter()
            .map(|(key, value)| KeyValuePair {
                key: key.clone(),
                value: Some(coerced_to_canonical(value)),
            })
            .collect(),
    )
}

// ---- spans -----------------------------------------------------------------

/// Insert row for the spans table.
#[derive(Debug, clickhouse::Row, Serialize)]
pub struct SpanWriteRow {
    start_time: i64,
    end_time: i64,
    trace_id: String,
    span_id: String,
    parent_span_id: String,
    name: String,
    service: String,
    kind: String,
    status_code: String,
    status_message: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    events: String,
    links: String,
}

impl SpanWriteRow {
    /// Builds the insert row for a validated span.
    #[must_use]
    pub fn from_span(span: &Span) -> Self {
        Self {
            start_time: nanos_to_i64(&span.start_time_unix_nano),
            end_time: nanos_to_i64(&span.end_time_unix_nano),
            trace_id: span.trace_id.clone(),
            span_id: span.span_id.clone(),
            parent_span_id: span.parent_span_id.clone().unwrap_or_default(),
            name: span.name.clone(),
            service: span.service.clone(),
            kind: span.kind.to_string(),
            status_code: span.status.code.to_string(),
            status_message: span.status.message.clone(),
            attributes: storage_map(span.attributes.as_ref()),
            resource_attributes: storage_map(Some(&span.resource.attributes)),
            scope_name: span.scope.name.clone(),
            scope_version: span.scope.version.clone(),
            events: events_to_text(&span.events),
            links: links_to_text(&span.links),
        }
    }
}

/// Insert row for the trace-id lookup table.
#[derive(Debug, clickhouse::Row, Serialize)]
pub struct TraceIndexRow {
    trace_id: String,
    start_time: i64,
    end_time: i64,
}

impl TraceIndexRow {
    /// Builds the lookup row for a validated span.
    #[must_use]
    pub fn from_span(span: &Span) -> Self {
        Self {
            trace_id: span.trace_id.clone(),
            start_time: nanos_to_i64(&span.start_time_unix_nano),
            end_time: nanos_to_i64(&span.end_time_unix_nano),
        }
    }
}

/// Read row matching [`crate::query::translate::SPAN_PROJECTION`].
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct SpanRow {
    start_time: String,
    end_time: String,
    trace_id: String,
    span_id: String,
    parent_span_id: String,
    name: String,
    service: String,
    kind: String,
    status_code: String,
    status_message: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    events: String,
    links: String,
}

impl SpanRow {
    /// Decodes the stored row back into a canonical span.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageRowParse`] if a column violates the
    /// expected shape.
    pub fn into_span(self) -> Result<Span, EngineError> {
        let kind = self.kind.parse().map_err(|_| {
            tracing::error!(span_id = %self.span_id, kind = %self.kind, "bad stored span kind");
            EngineError::StorageRowParse("stored row has an invalid span kind".to_string())
        })?;
        let status_code = self.status_code.parse().map_err(|_| {
            tracing::error!(span_id = %self.span_id, code = %self.status_code, "bad stored status");
            EngineError::StorageRowParse("stored row has an invalid status code".to_string())
        })?;

        Ok(Span {
            start_time_unix_nano: read_nanos(&self.start_time, "start_time")?,
            end_time_unix_nano: read_nanos(&self.end_time, "end_time")?,
            trace_id: self.trace_id,
            span_id: self.span_id,
            parent_span_id: (!self.parent_span_id.is_empty()).then_some(self.parent_span_id),
            name: self.name,
            service: self.service,
            kind,
            status: SpanStatus {
                code: status_code,
                message: self.status_message,
            },
            attributes: coerce_to_attribute_list(&self.attributes),
            events: events_from_text(&self.events)?,
            links: links_from_text(&self.links)?,
            resource: resource_from_map(&self.resource_attributes),
            scope: ScopeDesc {
                name: self.scope_name,
                version: self.scope_version,
                attributes: AttributeList::default(),
                dropped_attributes_count: 0,
            },
        })
    }
}

/// Read row for the trace-id range lookup.
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct TraceRangeRow {
    /// Earliest span start in native timestamp text.
    pub first_start: String,
    /// Latest span end in native timestamp text.
    pub last_end: String,
}

// ---- logs ------------------------------------------------------------------

/// Insert row for the logs table.
#[derive(Debug, clickhouse::Row, Serialize)]
pub struct LogWriteRow {
    timestamp: i64,
    observed_timestamp: i64,
    severity_number: i32,
    severity_text: String,
    level: String,
    body: String,
    body_value: String,
    service: String,
    trace_id: String,
    span_id: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
}

impl LogWriteRow {
    /// Builds the insert row for a validated log record.
    #[must_use]
    pub fn from_record(record: &LogRecord) -> Self {
        Self {
            timestamp: nanos_to_i64(&record.time_unix_nano),
            observed_timestamp: record
                .observed_time_unix_nano
                .as_deref()
                .map(nanos_to_i64)
                .unwrap_or_default(),
            severity_number: record.severity_number,
            severity_text: record.severity_text.clone(),
            level: record.severity_level().to_string(),
            body: record.body_text(),
            body_value: record
                .body
                .as_ref()
                .and_then(|body| serde_json::to_string(body).ok())
                .unwrap_or_default(),
            service: record.service.clone(),
            trace_id: record.trace_id.clone().unwrap_or_default(),
            span_id: record.span_id.clone().unwrap_or_default(),
            attributes: storage_map(record.attributes.as_ref()),
            resource_attributes: storage_map(Some(&record.resource.attributes)),
            scope_name: record.scope.name.clone(),
            scope_version: record.scope.version.clone(),
        }
    }
}

/// Read row matching [`crate::query::translate::LOG_PROJECTION`].
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct LogRow {
    timestamp: String,
    observed_timestamp: String,
    severity_number: i32,
    severity_text: String,
    #[allow(dead_code)]
    level: String,
    body: String,
    body_value: String,
    service: String,
    trace_id: String,
    span_id: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
}

impl LogRow {
    /// Decodes the stored row back into a canonical log record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageRowParse`] if a column violates the
    /// expected shape.
    pub fn into_record(self) -> Result<LogRecord, EngineError> {
        let observed = read_nanos(&self.observed_timestamp, "observed_timestamp")?;
        let body = if self.body_value.is_empty() {
            (!self.body.is_empty()).then(|| crate::models::CanonicalValue::String(self.body))
        } else {
            Some(serde_json::from_str(&self.body_value).map_err(|e| {
                tracing::error!(error = %e, "bad stored body column");
                EngineError::StorageRowParse("stored row has an invalid body column".to_string())
            })?)
        };

        Ok(LogRecord {
            time_unix_nano: read_nanos(&self.timestamp, "timestamp")?,
            observed_time_unix_nano: (observed != "0").then_some(observed),
            severity_number: self.severity_number,
            severity_text: self.severity_text,
            body,
            service: self.service,
            trace_id: (!self.trace_id.is_empty()).then_some(self.trace_id),
            span_id: (!self.span_id.is_empty()).then_some(self.span_id),
            attributes: coerce_to_attribute_list(&self.attributes),
            resource: resource_from_map(&self.resource_attributes),
            scope: ScopeDesc {
                name: self.scope_name,
                version: self.scope_version,
                attributes: AttributeList::default(),
                dropped_attributes_count: 0,
            },
        })
    }
}

// ---- metrics ---------------------------------------------------------------

fn exemplars_to_text(exemplars: &[Exemplar]) -> String {
    serde_json::to_string(exemplars).unwrap_or_else(|_| "[]".to_string())
}

fn exemplars_from_text(text: &str) -> Result<Vec<Exemplar>, EngineError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(error = %e, "bad stored exemplars column");
        EngineError::StorageRowParse("stored row has an invalid exemplars column".to_string())
    })
}

fn number_columns(value: &NumberValue) -> (f64, String) {
    match value {
        NumberValue::AsDouble(d) => (*d, String::new()),
        NumberValue::AsInt(i) => (0.0, i.clone()),
    }
}

fn number_from_columns(value_double: f64, value_int: String) -> NumberValue {
    if value_int.is_empty() {
        NumberValue::AsDouble(value_double)
    } else {
        NumberValue::AsInt(value_int)
    }
}

fn counts_to_json(counts: &[String]) -> String {
    serde_json::to_string(counts).unwrap_or_else(|_| "[]".to_string())
}

/// Re-types a stored 64-bit counter array through the coercion layer,
/// tolerating numbers or strings in the stored JSON.
fn counts_from_json(text: &str, context: &str) -> Result<Vec<String>, EngineError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<serde_json::Value> = serde_json::from_str(text).map_err(|e| {
        tracing::error!(column = context, error = %e, "bad stored counter array");
        EngineError::StorageRowParse("stored row has an invalid counter array".to_string())
    })?;
    Ok(coerce_u64_array(&raw).unwrap_or_default())
}

fn bounds_to_json(bounds: &[f64]) -> String {
    serde_json::to_string(bounds).unwrap_or_else(|_| "[]".to_string())
}

fn bounds_from_json(text: &str) -> Result<Vec<f64>, EngineError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(error = %e, "bad stored bounds column");
        EngineError::StorageRowParse("stored row has an invalid bounds column".to_string())
    })
}

/// The shared column values of one metric row on the write side.
struct SharedColumns {
    time: i64,
    start_time: i64,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
}

fn shared_columns(point: &MetricPoint, flags: u32) -> SharedColumns {
    SharedColumns {
        time: nanos_to_i64(&point.time_unix_nano),
        start_time: point
            .start_time_unix_nano
            .as_deref()
            .map(nanos_to_i64)
            .unwrap_or_default(),
        name: point.name.clone(),
        service: point.service.clone(),
        unit: point.unit.clone().unwrap_or_default(),
        description: point.description.clone().unwrap_or_default(),
        attributes: storage_map(point.attributes.as_ref()),
        resource_attributes: storage_map(Some(&point.resource.attributes)),
        scope_name: point.scope.name.clone(),
        scope_version: point.scope.version.clone(),
        point_hash: point.point_hash(),
        flags,
    }
}

/// The shared column values read back from one metric row.
struct SharedRead {
    time: String,
    start_time: String,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
}

impl SharedRead {
    fn into_point(self, exemplars: Vec<Exemplar>, data: MetricData) -> Result<MetricPoint, EngineError> {
        let start = read_nanos(&self.start_time, "start_time")?;
        Ok(MetricPoint {
            name: self.name,
            unit: (!self.unit.is_empty()).then_some(self.unit),
            description: (!self.description.is_empty()).then_some(self.description),
            service: self.service,
            start_time_unix_nano: (start != "0").then_some(start),
            time_unix_nano: read_nanos(&self.time, "time")?,
            attributes: coerce_to_attribute_list(&self.attributes),
            exemplars,
            data,
            resource: resource_from_map(&self.resource_attributes),
            scope: ScopeDesc {
                name: self.scope_name,
                version: self.scope_version,
                attributes: AttributeList::default(),
                dropped_attributes_count: 0,
            },
        })
    }
}

/// Insert row for the gauge table.
#[derive(Debug, clickhouse::Row, Serialize)]
pub struct GaugeWriteRow {
    time: i64,
    start_time: i64,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
    exemplars: String,
    value_double: f64,
    value_int: String,
}

impl GaugeWriteRow {
    /// Builds the insert row for a gauge point.
    #[must_use]
    pub fn from_point(point: &MetricPoint, data: &GaugeData) -> Self {
        let s = shared_columns(point, data.flags);
        let (value_double, value_int) = number_columns(&data.value);
        Self {
            time: s.time,
            start_time: s.start_time,
            name: s.name,
            service: s.service,
            unit: s.unit,
            description: s.description,
            attributes: s.attributes,
            resource_attributes: s.resource_attributes,
            scope_name: s.scope_name,
            scope_version: s.scope_version,
            point_hash: s.point_hash,
            flags: s.flags,
            exemplars: exemplars_to_text(&point.exemplars),
            value_double,
            value_int,
        }
    }
}

/// Read row for the gauge table.
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct GaugeRow {
    time: String,
    start_time: String,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
    exemplars: String,
    value_double: f64,
    value_int: String,
}

impl GaugeRow {
    /// Decodes the stored row back into a canonical point.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageRowParse`] on schema drift.
    pub fn into_point(self) -> Result<MetricPoint, EngineError> {
        let exemplars = exemplars_from_text(&self.exemplars)?;
        let data = MetricData::Gauge(GaugeData {
            value: number_from_columns(self.value_double, self.value_int),
            flags: self.flags,
        });
        SharedRead {
            time: self.time,
            start_time: self.start_time,
            name: self.name,
            service: self.service,
            unit: self.unit,
            description: self.description,
            attributes: self.attributes,
            resource_attributes: self.resource_attributes,
            scope_name: self.scope_name,
            scope_version: self.scope_version,
        }
        .into_point(exemplars, data)
    }

    /// The stored pagination tiebreaker.
    #[must_use]
    pub fn point_hash(&self) -> u64 {
        self.point_hash
    }
}

/// Insert row for the sum table.
#[derive(Debug, clickhouse::Row, Serialize)]
pub struct SumWriteRow {
    time: i64,
    start_time: i64,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
    exemplars: String,
    value_double: f64,
    value_int: String,
    monotonic: bool,
}

impl SumWriteRow {
    /// Builds the insert row for a sum point.
    #[must_use]
    pub fn from_point(point: &MetricPoint, data: &SumData) -> Self {
        let s = shared_columns(point, data.flags);
        let (value_double, value_int) = number_columns(&data.value);
        Self {
            time: s.time,
            start_time: s.start_time,
            name: s.name,
            service: s.service,
            unit: s.unit,
            description: s.description,
            attributes: s.attributes,
            resource_attributes: s.resource_attributes,
            scope_name: s.scope_name,
            scope_version: s.scope_version,
            point_hash: s.point_hash,
            flags: s.flags,
            exemplars: exemplars_to_text(&point.exemplars),
            value_double,
            value_int,
            monotonic: data.monotonic,
        }
    }
}

/// Read row for the sum table.
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct SumRow {
    time: String,
    start_time: String,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
    exemplars: String,
    value_double: f64,
    value_int: String,
    monotonic: bool,
}

impl SumRow {
    /// Decodes the stored row back into a canonical point.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageRowParse`] on schema drift.
    pub fn into_point(self) -> Result<MetricPoint, EngineError> {
        let exemplars = exemplars_from_text(&self.exemplars)?;
        let data = MetricData::Sum(SumData {
            value: number_from_columns(self.value_double, self.value_int),
            monotonic: self.monotonic,
            flags: self.flags,
        });
        SharedRead {
            time: self.time,
            start_time: self.start_time,
            name: self.name,
            service: self.service,
            unit: self.unit,
            description: self.description,
            attributes: self.attributes,
            resource_attributes: self.resource_attributes,
            scope_name: self.scope_name,
            scope_version: self.scope_version,
        }
        .into_point(exemplars, data)
    }

    /// The stored pagination tiebreaker.
    #[must_use]
    pub fn point_hash(&self) -> u64 {
        self.point_hash
    }
}

/// Insert row for the histogram table.
#[derive(Debug, clickhouse::Row, Serialize)]
pub struct HistogramWriteRow {
    time: i64,
    start_time: i64,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
    exemplars: String,
    count: u64,
    sum_value: Option<f64>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    bucket_counts: String,
    explicit_bounds: String,
}

impl HistogramWriteRow {
    /// Builds the insert row for a histogram point.
    #[must_use]
    pub fn from_point(point: &MetricPoint, data: &HistogramData) -> Self {
        let s = shared_columns(point, data.flags);
        Self {
            time: s.time,
            start_time: s.start_time,
            name: s.name,
            service: s.service,
            unit: s.unit,
            description: s.description,
            attributes: s.attributes,
            resource_attributes: s.resource_attributes,
            scope_name: s.scope_name,
            scope_version: s.scope_version,
            point_hash: s.point_hash,
            flags: s.flags,
            exemplars: exemplars_to_text(&point.exemplars),
            count: data.count.parse().unwrap_or(0),
            sum_value: data.sum,
            min_value: data.min,
            max_value: data.max,
            bucket_counts: counts_to_json(&data.bucket_counts),
            explicit_bounds: bounds_to_json(&data.explicit_bounds),
        }
    }
}

/// Read row for the histogram table.
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct HistogramRow {
    time: String,
    start_time: String,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
    exemplars: String,
    count: u64,
    sum_value: Option<f64>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    bucket_counts: String,
    explicit_bounds: String,
}

impl HistogramRow {
    /// Decodes the stored row back into a canonical point.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageRowParse`] on schema drift.
    pub fn into_point(self) -> Result<MetricPoint, EngineError> {
        let exemplars = exemplars_from_text(&self.exemplars)?;
        let data = MetricData::Histogram(HistogramData {
            count: self.count.to_string(),
            sum: self.sum_value,
            min: self.min_value,
            max: self.max_value,
            bucket_counts: counts_from_json(&self.bucket_counts, "bucket_counts")?,
            explicit_bounds: bounds_from_json(&self.explicit_bounds)?,
            flags: self.flags,
        });
        SharedRead {
            time: self.time,
            start_time: self.start_time,
            name: self.name,
            service: self.service,
            unit: self.unit,
            description: self.description,
            attributes: self.attributes,
            resource_attributes: self.resource_attributes,
            scope_name: self.scope_name,
            scope_version: self.scope_version,
        }
        .into_point(exemplars, data)
    }

    /// The stored pagination tiebreaker.
    #[must_use]
    pub fn point_hash(&self) -> u64 {
        self.point_hash
    }
}

/// Insert row for the exponential histogram table.
#[derive(Debug, clickhouse::Row, Serialize)]
pub struct ExponentialHistogramWriteRow {
    time: i64,
    start_time: i64,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
    exemplars: String,
    count: u64,
    sum_value: Option<f64>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    scale: i32,
    zero_count: u64,
    zero_threshold: f64,
    positive_offset: i32,
    positive_buckets: String,
    negative_offset: i32,
    negative_buckets: String,
}

impl ExponentialHistogramWriteRow {
    /// Builds the insert row for an exponential histogram point.
    #[must_use]
    pub fn from_point(point: &MetricPoint, data: &ExponentialHistogramData) -> Self {
        let s = shared_columns(point, data.flags);
        Self {
            time: s.time,
            start_time: s.start_time,
            name: s.name,
            service: s.service,
            unit: s.unit,
            description: s.description,
            attributes: s.attributes,
            resource_attributes: s.resource_attributes,
            scope_name: s.scope_name,
            scope_version: s.scope_version,
            point_hash: s.point_hash,
            flags: s.flags,
            exemplars: exemplars_to_text(&point.exemplars),
            count: data.count.parse().unwrap_or(0),
            sum_value: data.sum,
            min_value: data.min,
            max_value: data.max,
            scale: data.scale,
            zero_count: data.zero_count.parse().unwrap_or(0),
            zero_threshold: data.zero_threshold,
            positive_offset: data.positive.offset,
            positive_buckets: counts_to_json(&data.positive.bucket_counts),
            negative_offset: data.negative.offset,
            negative_buckets: counts_to_json(&data.negative.bucket_counts),
        }
    }
}

/// Read row for the exponential histogram table.
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct ExponentialHistogramRow {
    time: String,
    start_time: String,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
    exemplars: String,
    count: u64,
    sum_value: Option<f64>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    scale: i32,
    zero_count: u64,
    zero_threshold: f64,
    positive_offset: i32,
    positive_buckets: String,
    negative_offset: i32,
    negative_buckets: String,
}

impl ExponentialHistogramRow {
    /// Decodes the stored row back into a canonical point.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageRowParse`] on schema drift.
    pub fn into_point(self) -> Result<MetricPoint, EngineError> {
        let exemplars = exemplars_from_text(&self.exemplars)?;
        let data = MetricData::ExponentialHistogram(ExponentialHistogramData {
            count: self.count.to_string(),
            sum: self.sum_value,
            min: self.min_value,
            max: self.max_value,
            scale: self.scale,
            zero_count: self.zero_count.to_string(),
            zero_threshold: self.zero_threshold,
            positive: ExponentialBuckets {
                offset: self.positive_offset,
                bucket_counts: counts_from_json(&self.positive_buckets, "positive_buckets")?,
            },
            negative: ExponentialBuckets {
                offset: self.negative_offset,
                bucket_counts: counts_from_json(&self.negative_buckets, "negative_buckets")?,
            },
            flags: self.flags,
        });
        SharedRead {
            time: self.time,
            start_time: self.start_time,
            name: self.name,
            service: self.service,
            unit: self.unit,
            description: self.description,
            attributes: self.attributes,
            resource_attributes: self.resource_attributes,
            scope_name: self.scope_name,
            scope_version: self.scope_version,
        }
        .into_point(exemplars, data)
    }

    /// The stored pagination tiebreaker.
    #[must_use]
    pub fn point_hash(&self) -> u64 {
        self.point_hash
    }
}

/// Insert row for the summary table.
#[derive(Debug, clickhouse::Row, Serialize)]
pub struct SummaryWriteRow {
    time: i64,
    start_time: i64,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
    count: u64,
    sum_value: f64,
    quantiles: String,
}

impl SummaryWriteRow {
    /// Builds the insert row for a summary point.
    #[must_use]
    pub fn from_point(point: &MetricPoint, data: &SummaryData) -> Self {
        let s = shared_columns(point, data.flags);
        Self {
            time: s.time,
            start_time: s.start_time,
            name: s.name,
            service: s.service,
            unit: s.unit,
            description: s.description,
            attributes: s.attributes,
            resource_attributes: s.resource_attributes,
            scope_name: s.scope_name,
            scope_version: s.scope_version,
            point_hash: s.point_hash,
            flags: s.flags,
            count: data.count.parse().unwrap_or(0),
            sum_value: data.sum,
            quantiles: serde_json::to_string(&data.quantile_values)
                .unwrap_or_else(|_| "[]".to_string()),
        }
    }
}

/// Read row for the summary table.
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct SummaryRow {
    time: String,
    start_time: String,
    name: String,
    service: String,
    unit: String,
    description: String,
    attributes: BTreeMap<String, String>,
    resource_attributes: BTreeMap<String, String>,
    scope_name: String,
    scope_version: String,
    point_hash: u64,
    flags: u32,
    count: u64,
    sum_value: f64,
    quantiles: String,
}

impl SummaryRow {
    /// Decodes the stored row back into a canonical point.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageRowParse`] on schema drift.
    pub fn into_point(self) -> Result<MetricPoint, EngineError> {
        let quantile_values: Vec<QuantileValue> = if self.quantiles.is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&self.quantiles).map_err(|e| {
                tracing::error!(error = %e, "bad stored quantiles column");
                EngineError::StorageRowParse(
                    "stored row has an invalid quantiles column".to_string(),
                )
            })?
        };
        let data = MetricData::Summary(SummaryData {
            count: self.count.to_string(),
            sum: self.sum_value,
            quantile_values,
            flags: self.flags,
        });
        SharedRead {
            time: self.time,
            start_time: self.start_time,
            name: self.name,
            service: self.service,
            unit: self.unit,
            description: self.description,
            attributes: self.attributes,
            resource_attributes: self.resource_attributes,
            scope_name: self.scope_name,
            scope_version: self.scope_version,
        }
        .into_point(Vec::new(), data)
    }

    /// The stored pagination tiebreaker.
    #[must_use]
    pub fn point_hash(&self) -> u64 {
        self.point_hash
    }
}

// ---- discovery -------------------------------------------------------------

/// Read row for the fast-path identities table.
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct IdentityRow {
    /// Metric name.
    pub name: String,
    /// Metric kind text.
    pub kind: String,
    /// Declared unit ('' when never declared).
    pub unit: String,
    /// Declared description ('' when never declared).
    pub description: String,
}

/// Read row for the fast-path attribute-values table.
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct AttributeValueRow {
    /// Metric name.
    pub name: String,
    /// Metric kind text.
    pub kind: String,
    /// `point` or `resource`.
    pub source: String,
    /// Attribute key.
    pub key: String,
    /// One observed value.
    pub value: String,
}

/// Read row for the slow-path union scan.
#[derive(Debug, clickhouse::Row, Deserialize)]
pub struct DiscoveryScanRow {
    /// Metric name.
    pub name: String,
    /// Metric kind text.
    pub kind: String,
    /// Declared unit ('' when never declared).
    pub unit: String,
    /// Declared description ('' when never declared).
    pub description: String,
    /// Point attribute map.
    pub attributes: BTreeMap<String, String>,
    /// Resource attribute map.
    pub resource_attributes: BTreeMap<String, String>,
}
