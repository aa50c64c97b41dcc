//! Filter-to-SQL translation.
//!
//! Pure functions from a filter to `(query text, ordered parameters)`.
//! Nothing here executes a query. Every caller-controlled literal is a
//! bound parameter with one deliberate exception: attribute keys, which
//! must appear inside the map-lookup expression and are therefore
//! validated against a strict allow-list before being spliced. Table names
//! come from the pre-validated kind enum, never from caller text.

use crate::coerce::nanos_to_native;
use crate::error::EngineError;
use crate::models::MetricKind;
use crate::query::cursor::Cursor;
use crate::query::filter::{effective_limit, LogFilter, MetricFilter, TraceFilter};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// One bound query parameter, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// A text parameter.
    Text(String),
    /// A signed 64-bit parameter.
    I64(i64),
    /// An unsigned 64-bit parameter.
    U64(u64),
}

/// A compiled query: SQL text with `?` placeholders plus its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// The SQL text.
    pub sql: String,
    /// Parameters, ordered to match the placeholders.
    pub params: Vec<SqlValue>,
}

/// Upper bound on spans returned for a single trace lookup.
pub const MAX_TRACE_SPANS: usize = 10_000;

/// The spans table.
pub const SPANS_TABLE: &str = "spans";
/// The logs table.
pub const LOGS_TABLE: &str = "logs";
/// The trace-id to time-range lookup table.
pub const TRACE_INDEX_TABLE: &str = "trace_index";

/// The backing table for a metric kind.
#[must_use]
pub fn metric_table(kind: MetricKind) -> &'static str {
    match kind {
        MetricKind::Gauge => "metrics_gauge",
        MetricKind::Sum => "metrics_sum",
        MetricKind::Histogram => "metrics_histogram",
        MetricKind::ExponentialHistogram => "metrics_exponential_histogram",
        MetricKind::Summary => "metrics_summary",
    }
}

/// Column projection for span reads. Timestamps project through
/// `toString` so the row layer re-types them with the coercion functions.
pub const SPAN_PROJECTION: &str = "toString(start_time) AS start_time, \
     toString(end_time) AS end_time, trace_id, span_id, parent_span_id, name, service, \
     kind, status_code, status_message, attributes, resource_attributes, scope_name, \
     scope_version, events, links";

/// Column projection for log reads.
pub const LOG_PROJECTION: &str = "toString(timestamp) AS timestamp, \
     toString(observed_timestamp) AS observed_timestamp, severity_number, severity_text, \
     level, body, body_value, service, trace_id, span_id, attributes, \
     resource_attributes, scope_name, scope_version";

/// Shared column projection for metric reads, before kind-specific columns.
const METRIC_SHARED_PROJECTION: &str = "toString(time) AS time, \
     toString(start_time) AS start_time, name, service, unit, description, attributes, \
     resource_attributes, scope_name, scope_version, point_hash, flags";

/// The fixed column projection for one metric kind: shared identity and
/// scope columns, exemplars for every kind except summary, then the
/// kind-specific value columns.
#[must_use]
pub fn metric_projection(kind: MetricKind) -> String {
    let kind_columns = match kind {
        MetricKind::Gauge => "value_double, value_int",
        MetricKind::Sum => "value_double, value_int, monotonic",
        MetricKind::Histogram => {
            "count, sum_value, min_value, max_value, bucket_counts, explicit_bounds"
        }
        MetricKind::ExponentialHistogram => {
            "count, sum_value, min_value, max_value, scale, zero_count, zero_threshold, \
             positive_offset, positive_buckets, negative_offset, negative_buckets"
        }
        MetricKind::Summary => "count, sum_value, quantiles",
    };

    if kind == MetricKind::Summary {
        format!("{METRIC_SHARED_PROJECTION}, {kind_columns}")
    } else {
        format!("{METRIC_SHARED_PROJECTION}, exemplars, {kind_columns}")
    }
}

/// Validates an attribute key against the allow-listed character set.
///
/// Keys are the single case where caller text is spliced into query text,
/// so anything outside letters, digits, `.`, `_`, `-`, `/` is rejected
/// before any SQL is assembled.
///
/// # Errors
///
/// Returns a [`EngineError::Validation`] error for an empty key or a key
/// containing a disallowed character.
pub fn validate_attribute_key(key: &str) -> Result<(), EngineError> {
    if key.is_empty() {
        return Err(EngineError::Validation(
            "attribute filter key cannot be empty".to_string(),
        ));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/'))
    {
        return Err(EngineError::Validation(format!(
            "attribute filter key contains disallowed characters: {key:?}"
        )));
    }
    Ok(())
}

/// Escapes LIKE wildcard and escape characters so the pattern matches the
/// literal text verbatim.
#[must_use]
pub fn escape_like(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Converts a decimal-nanosecond filter bound into a native timestamp
/// parameter.
fn time_param(nanos: &str, field: &str) -> Result<SqlValue, EngineError> {
    let native = nanos_to_native(nanos).map_err(|_| {
        EngineError::Validation(format!("{field} is not a decimal nanosecond value: {nanos:?}"))
    })?;
    Ok(SqlValue::Text(native))
}

/// Appends one equality predicate per attribute filter entry. Keys are
/// validated, then spliced into the map lookup; values are bound.
fn push_attribute_predicates(
    sql: &mut String,
    params: &mut Vec<SqlValue>,
    column: &str,
    filters: &BTreeMap<String, String>,
) -> Result<(), EngineError> {
    for (key, value) in filters {
        validate_attribute_key(key)?;
        write!(sql, " AND {column}['{key}'] = ?").unwrap();
        params.push(SqlValue::Text(value.clone()));
    }
    Ok(())
}

/// Compiles a span search.
///
/// # Errors
///
/// Returns [`EngineError::Cursor`] for a malformed cursor (before any SQL
/// is assembled) and [`EngineError::Validation`] for malformed filter
/// values or attribute keys.
pub fn compile_trace_search(filter: &TraceFilter) -> Result<CompiledQuery, EngineError> {
    // Cursor problems must surface before any query text exists.
    let cursor = filter.cursor.as_deref().map(Cursor::parse).transpose()?;
    validate_attribute_filters(&filter.attributes, &filter.resource_attributes)?;

    let mut sql = format!("SELECT {SPAN_PROJECTION} FROM {SPANS_TABLE} WHERE 1 = 1");
    let mut params = Vec::new();

    if let Some(trace_id) = &filter.trace_id {
        sql.push_str(" AND trace_id = ?");
        params.push(SqlValue::Text(trace_id.clone()));
    }
    if let Some(span_id) = &filter.span_id {
        sql.push_str(" AND span_id = ?");
        params.push(SqlValue::Text(span_id.clone()));
    }
    if let Some(service) = &filter.service {
        sql.push_str(" AND service = ?");
        params.push(SqlValue::Text(service.clone()));
    }
    if let Some(name) = &filter.name {
        sql.push_str(" AND name = ?");
        params.push(SqlValue::Text(name.clone()));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind = ?");
        params.push(SqlValue::Text(kind.to_string()));
    }
    if let Some(status) = filter.status {
        sql.push_str(" AND status_code = ?");
        params.push(SqlValue::Text(status.to_string()));
    }
    if let Some(start) = &filter.start_nanos {
        sql.push_str(" AND start_time >= ?");
        params.push(time_param(start, "startNanos")?);
    }
    if let Some(end) = &filter.end_nanos {
        sql.push_str(" AND start_time <= ?");
        params.push(time_param(end, "endNanos")?);
    }
    if let Some(min) = &filter.min_duration_nanos {
        sql.push_str(
            " AND (toUnixTimestamp64Nano(end_time) - toUnixTimestamp64Nano(start_time)) >= ?",
        );
        params.push(duration_param(min, "minDurationNanos")?);
    }
    if let Some(max) = &filter.max_duration_nanos {
        sql.push_str(
            " AND (toUnixTimestamp64Nano(end_time) - toUnixTimestamp64Nano(start_time)) <= ?",
        );
        params.push(duration_param(max, "maxDurationNanos")?);
    }

    push_attribute_predicates(&mut sql, &mut params, "attributes", &filter.attributes)?;
    push_attribute_predicates(
        &mut sql,
        &mut params,
        "resource_attributes",
        &filter.resource_attributes,
    )?;

    if let Some(cursor) = cursor {
        let tiebreaker = cursor.tiebreaker.clone().ok_or_else(|| {
            EngineError::Cursor("trace cursor requires a span-id tiebreaker".to_string())
        })?;
        let beyond = filter.order.beyond();
        let ts = time_param(&cursor.timestamp_nanos, "cursor")
            .map_err(|_| EngineError::Cursor("cursor timestamp out of range".to_string()))?;
        write!(
            sql,
            " AND (start_time {beyond} ? OR (start_time = ? AND span_id {beyond} ?))"
        )
        .unwrap();
        params.push(ts.clone());
        params.push(ts);
        params.push(SqlValue::Text(tiebreaker));
    }

    let dir = filter.order.keyword();
    let limit = effective_limit(filter.limit) + 1;
    write!(
        sql,
        " ORDER BY start_time {dir}, span_id {dir} LIMIT {limit}"
    )
    .unwrap();

    Ok(CompiledQuery { sql, params })
}

/// Compiles a log search.
///
/// # Errors
///
/// Same error contract as [`compile_trace_search`].
pub fn compile_log_search(filter: &LogFilter) -> Result<CompiledQuery, EngineError> {
    let cursor = filter.cursor.as_deref().map(Cursor::parse).transpose()?;
    validate_attribute_filters(&filter.attributes, &filter.resource_attributes)?;

    let mut sql = format!("SELECT {LOG_PROJECTION} FROM {LOGS_TABLE} WHERE 1 = 1");
    let mut params = Vec::new();

    if let Some(service) = &filter.service {
        sql.push_str(" AND service = ?");
        params.push(SqlValue::Text(service.clone()));
    }
    if let Some(trace_id) = &filter.trace_id {
        sql.push_str(" AND trace_id = ?");
        params.push(SqlValue::Text(trace_id.clone()));
    }
    if let Some(span_id) = &filter.span_id {
        sql.push_str(" AND span_id = ?");
        params.push(SqlValue::Text(span_id.clone()));
    }
    if let Some(min) = filter.min_severity {
        sql.push_str(" AND severity_number >= ?");
        params.push(SqlValue::I64(i64::from(min)));
    }
    if let Some(max) = filter.max_severity {
        sql.push_str(" AND severity_number <= ?");
        params.push(SqlValue::I64(i64::from(max)));
    }
    if let Some(pattern) = &filter.body_contains {
        sql.push_str(" AND body LIKE ?");
        params.push(SqlValue::Text(format!("%{}%", escape_like(pattern))));
    }
    if let Some(start) = &filter.start_nanos {
        sql.push_str(" AND timestamp >= ?");
        params.push(time_param(start, "startNanos")?);
    }
    if let Some(end) = &filter.end_nanos {
        sql.push_str(" AND timestamp <= ?");
        params.push(time_param(end, "endNanos")?);
    }

    push_attribute_predicates(&mut sql, &mut params, "attributes", &filter.attributes)?;
    push_attribute_predicates(
        &mut sql,
        &mut params,
        "resource_attributes",
        &filter.resource_attributes,
    )?;

    if let Some(cursor) = cursor {
        // Timestamp-only pagination; see the LogFilter docs for the page
        // boundary caveat on colliding timestamps.
        let ts = time_param(&cursor.timestamp_nanos, "cursor")
            .map_err(|_| EngineError::Cursor("cursor timestamp out of range".to_string()))?;
        write!(sql, " AND timestamp {} ?", filter.order.beyond())
            .unwrap();
        params.push(ts);
    }

    let dir = filter.order.keyword();
    let limit = effective_limit(filter.limit) + 1;
    write!(sql, " ORDER BY timestamp {dir} LIMIT {limit}")
        .unwrap();

    Ok(CompiledQuery { sql, params })
}

/// Compiles a metric search against the kind's table and projection.
///
/// # Errors
///
/// Same error contract as [`compile_trace_search`]; additionally a metric
/// cursor must carry a numeric point-hash tiebreaker.
pub fn compile_metric_search(filter: &MetricFilter) -> Result<CompiledQuery, EngineError> {
    let cursor = filter.cursor.as_deref().map(Cursor::parse).transpose()?;
    let cursor_hash = cursor.as_ref().map(Cursor::point_hash).transpose()?;
    validate_attribute_filters(&filter.attributes, &filter.resource_attributes)?;

    let table = metric_table(filter.kind);
    let projection = metric_projection(filter.kind);

    let mut sql = format!("SELECT {projection} FROM {table} WHERE 1 = 1");
    let mut params = Vec::new();

    if let Some(name) = &filter.name {
        sql.push_str(" AND name = ?");
        params.push(SqlValue::Text(name.clone()));
    }
    if let Some(service) = &filter.service {
        sql.push_str(" AND service = ?");
        params.push(SqlValue::Text(service.clone()));
    }
    if let Some(unit) = &filter.unit {
        sql.push_str(" AND unit = ?");
        params.push(SqlValue::Text(unit.clone()));
    }
    if let Some(start) = &filter.start_nanos {
        sql.push_str(" AND time >= ?");
        params.push(time_param(start, "startNanos")?);
    }
    if let Some(end) = &filter.end_nanos {
        sql.push_str(" AND time <= ?");
        params.push(time_param(end, "endNanos")?);
    }

    push_attribute_predicates(&mut sql, &mut params, "attributes", &filter.attributes)?;
    push_attribute_predicates(
        &mut sql,
        &mut params,
        "resource_attributes",
        &filter.resource_attributes,
    )?;

    if let (Some(cursor), Some(hash)) = (cursor, cursor_hash) {
        let beyond = filter.order.beyond();
        let ts = time_param(&cursor.timestamp_nanos, "cursor")
            .map_err(|_| EngineError::Cursor("cursor timestamp out of range".to_string()))?;
        write!(
            sql,
            " AND (time {beyond} ? OR (time = ? AND point_hash {beyond} ?))"
        )
        .unwrap();
        params.push(ts.clone());
        params.push(ts);
        params.push(SqlValue::U64(hash));
    }

    let dir = filter.order.keyword();
    let limit = effective_limit(filter.limit) + 1;
    write!(sql, " ORDER BY time {dir}, point_hash {dir} LIMIT {limit}")
        .unwrap();

    Ok(CompiledQuery { sql, params })
}

/// Compiles the trace-id time-range probe against the lookup table.
#[must_use]
pub fn compile_trace_range_lookup(trace_id: &str) -> CompiledQuery {
    CompiledQuery {
        sql: format!(
            "SELECT toString(min(start_time)) AS first_start, \
             toString(max(end_time)) AS last_end FROM {TRACE_INDEX_TABLE} \
             WHERE trace_id = ? GROUP BY trace_id"
        ),
        params: vec![SqlValue::Text(trace_id.to_string())],
    }
}

/// Compiles the span fetch for one trace, optionally narrowed to the time
/// range the lookup table reported.
#[must_use]
pub fn compile_trace_spans(trace_id: &str, range: Option<(&str, &str)>) -> CompiledQuery {
    let mut sql = format!("SELECT {SPAN_PROJECTION} FROM {SPANS_TABLE} WHERE trace_id = ?");
    let mut params = vec![SqlValue::Text(trace_id.to_string())];

    if let Some((first_start, last_end)) = range {
        sql.push_str(" AND start_time >= ? AND start_time <= ?");
        params.push(SqlValue::Text(first_start.to_string()));
        params.push(SqlValue::Text(last_end.to_string()));
    }

    write!(
        sql,
        " ORDER BY start_time ASC, span_id ASC LIMIT {MAX_TRACE_SPANS}"
    )
    .unwrap();

    CompiledQuery { sql, params }
}

fn duration_param(nanos: &str, field: &str) -> Result<SqlValue, EngineError> {
    nanos
        .parse::<i64>()
        .map(SqlValue::I64)
        .map_err(|_| {
            EngineError::Validation(format!(
                "{field} is not a decimal nanosecond value: {nanos:?}"
            ))
        })
}

fn validate_attribute_filters(
    attributes: &BTreeMap<String, String>,
    resource_attributes: &BTreeMap<String, String>,
) -> Result<(), EngineError> {
    for key in attributes.keys().chain(resource_attributes.keys()) {
        validate_attribute_key(key)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::cursor::SortOrder;

    #[test]
    fn test_attribute_key_allow_list() {
        assert!(validate_attribute_key("http.status_code").is_ok());
        assert!(validate_attribute_key("k8s.pod/name-0").is_ok());
        assert!(validate_attribute_key("bad;key").is_err());
        assert!(validate_attribute_key("o'brien").is_err());
        assert!(validate_attribute_key("space key").is_err());
        assert!(validate_attribute_key("").is_err());
    }

    #[test]
    fn test_injection_attempt_fails_before_sql_is_built() {
        let filter = TraceFilter::new().with_attribute("k'] = 1 OR ['x", "v");
        let result = compile_trace_search(&filter);
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done\\now"), "100\\%\\_done\\\\now");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_trace_search_binds_all_literals() {
        let filter = TraceFilter::new()
            .with_trace_id("0af7651916cd43dd8448eb211c80319c")
            .with_service("checkout")
            .with_attribute("http.method", "GET");

        let compiled = compile_trace_search(&filter).unwrap();
        assert!(compiled.sql.contains("trace_id = ?"));
        assert!(compiled.sql.contains("attributes['http.method'] = ?"));
        // Values never appear in the SQL text.
        assert!(!compiled.sql.contains("checkout"));
        assert!(!compiled.sql.contains("GET"));
        assert_eq!(
            compiled.params,
            vec![
                SqlValue::Text("0af7651916cd43dd8448eb211c80319c".to_string()),
                SqlValue::Text("checkout".to_string()),
                SqlValue::Text("GET".to_string()),
            ]
        );
    }

    #[test]
    fn test_trace_search_time_bounds_are_native_text() {
        let filter = TraceFilter::new().with_time_range("0", "1704067200123456789");
        let compiled = compile_trace_search(&filter).unwrap();
        assert_eq!(
            compiled.params,
            vec![
                SqlValue::Text("1970-01-01 00:00:00.000000000".to_string()),
                SqlValue::Text("2024-01-01 00:00:00.123456789".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_order_is_descending_with_probe_row() {
        let compiled = compile_trace_search(&TraceFilter::new().with_limit(10)).unwrap();
        assert!(compiled
            .sql
            .ends_with("ORDER BY start_time DESC, span_id DESC LIMIT 11"));
    }

    #[test]
    fn test_trace_cursor_compiles_compound_inequality() {
        let filter = TraceFilter::new().with_cursor("1700000000000000000:b7ad6b7169203331");
        let compiled = compile_trace_search(&filter).unwrap();
        assert!(compiled
            .sql
            .contains("(start_time < ? OR (start_time = ? AND span_id < ?))"));
        assert_eq!(compiled.params.len(), 3);

        let ascending = TraceFilter::new()
            .with_order(SortOrder::Asc)
            .with_cursor("1700000000000000000:b7ad6b7169203331");
        let compiled = compile_trace_search(&ascending).unwrap();
        assert!(compiled
            .sql
            .contains("(start_time > ? OR (start_time = ? AND span_id > ?))"));
    }

    #[test]
    fn test_bad_cursor_fails_before_query_text() {
        let filter = TraceFilter::new().with_cursor("garbage cursor");
        assert!(matches!(
            compile_trace_search(&filter),
            Err(EngineError::Cursor(_))
        ));
    }

    #[test]
    fn test_log_contains_is_escaped() {
        let filter = LogFilter::new().with_body_contains("100%_done");
        let compiled = compile_log_search(&filter).unwrap();
        assert!(compiled.sql.contains("body LIKE ?"));
        assert_eq!(
            compiled.params,
            vec![SqlValue::Text("%100\\%\\_done%".to_string())]
        );
    }

    #[test]
    fn test_log_cursor_is_timestamp_only() {
        let filter = LogFilter::new().with_cursor("1700000000000000000");
        let compiled = compile_log_search(&filter).unwrap();
        assert!(compiled.sql.contains("timestamp < ?"));
        assert!(!compiled.sql.contains("OR"));
    }

    #[test]
    fn test_metric_search_selects_kind_table_and_projection() {
        for kind in MetricKind::ALL {
            let compiled = compile_metric_search(&MetricFilter::new(kind)).unwrap();
            assert!(compiled.sql.contains(metric_table(kind)), "{kind}");

            let has_exemplars = compiled.sql.contains("exemplars");
            assert_eq!(has_exemplars, kind != MetricKind::Summary, "{kind}");
        }
    }

    #[test]
    fn test_metric_cursor_requires_numeric_tiebreaker() {
        let filter =
            MetricFilter::new(MetricKind::Gauge).with_cursor("1700000000000000000:not-a-hash");
        assert!(matches!(
            compile_metric_search(&filter),
            Err(EngineError::Cursor(_))
        ));

        let ok = MetricFilter::new(MetricKind::Gauge)
            .with_cursor("1700000000000000000:12345678901234567890");
        let compiled = compile_metric_search(&ok).unwrap();
        assert!(compiled
            .sql
            .contains("(time < ? OR (time = ? AND point_hash < ?))"));
        assert_eq!(
            compiled.params.last(),
            Some(&SqlValue::U64(12_345_678_901_234_567_890))
        );
    }

    #[test]
    fn test_trace_lookup_queries() {
        let range = compile_trace_range_lookup("abc123");
        assert!(range.sql.contains(TRACE_INDEX_TABLE));
        assert_eq!(range.params, vec![SqlValue::Text("abc123".to_string())]);

        let spans = compile_trace_spans(
            "abc123",
            Some(("2024-01-01 00:00:00.000000000", "2024-01-01 00:00:01.000000000")),
        );
        assert!(spans.sql.contains("start_time >= ? AND start_time <= ?"));
        assert_eq!(spans.params.len(), 3);
        assert!(spans.sql.contains("ORDER BY start_time ASC"));
    }
}
