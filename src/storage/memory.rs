//! In-memory store implementations.
//!
//! Development and test engines with the same filter, ordering, cursor,
//! and discovery semantics as the ClickHouse stores: attribute keys are
//! validated the same way, cursors parse the same way, and pages derive
//! their cursors from the same sort keys. Data is not persisted across
//! restarts.

use crate::discovery::DiscoveryIndex;
use crate::error::EngineError;
use crate::models::metric::MetricPoint;
use crate::models::value::AttributeList;
use crate::models::{DiscoveredMetric, LogRecord, Span};
use crate::query::cursor::{paginate, Cursor, Page, SortOrder};
use crate::query::filter::{effective_limit, LogFilter, MetricFilter, TraceFilter};
use crate::query::translate::validate_attribute_key;
use crate::storage::context::CallContext;
use crate::storage::{LogStore, MetricStore, TraceStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;

fn lock_error() -> EngineError {
    EngineError::Storage("failed to acquire store lock".to_string())
}

fn parse_filter_nanos(text: &str, field: &str) -> Result<i128, EngineError> {
    text.parse().map_err(|_| {
        EngineError::Validation(format!("{field} is not a decimal nanosecond value: {text:?}"))
    })
}

fn entity_nanos(text: &str) -> i128 {
    text.parse().unwrap_or(0)
}

/// True when `(ts, tiebreak)` lies strictly beyond the cursor position in
/// the requested direction.
fn beyond_cursor(order: SortOrder, ts: i128, tiebreak: Option<&str>, cursor: &ParsedCursor) -> bool {
    if ts != cursor.ts {
        return match order {
            SortOrder::Desc => ts < cursor.ts,
            SortOrder::Asc => ts > cursor.ts,
        };
    }
    match (&cursor.tiebreak, tiebreak) {
        (Some(cursor_tb), Some(tb)) => match order {
            SortOrder::Desc => tb < cursor_tb.as_str(),
            SortOrder::Asc => tb > cursor_tb.as_str(),
        },
        // Timestamp-only cursors exclude the whole colliding timestamp.
        _ => false,
    }
}

struct ParsedCursor {
    ts: i128,
    tiebreak: Option<String>,
}

fn parse_cursor(raw: Option<&str>) -> Result<Option<ParsedCursor>, EngineError> {
    let Some(raw) = raw else { return Ok(None) };
    let cursor = Cursor::parse(raw)?;
    Ok(Some(ParsedCursor {
        ts: cursor
            .timestamp_nanos
            .parse()
            .map_err(|_| EngineError::Cursor("cursor timestamp out of range".to_string()))?,
        tiebreak: cursor.tiebreaker,
    }))
}

fn attrs_match(attributes: Option<&AttributeList>, filters: &BTreeMap<String, String>) -> bool {
    if filters.is_empty() {
        return true;
    }
    let map = attributes.map(AttributeList::storage_map).unwrap_or_default();
    filters
        .iter()
        .all(|(key, value)| map.get(key) == Some(value))
}

fn validate_filter_keys(
    attributes: &BTreeMap<String, String>,
    resource_attributes: &BTreeMap<String, String>,
) -> Result<(), EngineError> {
    for key in attributes.keys().chain(resource_attributes.keys()) {
        validate_attribute_key(key)?;
    }
    Ok(())
}

fn sort_and_page<T>(
    mut rows: Vec<(i128, String, T)>,
    order: SortOrder,
    limit: usize,
    tiebreak_in_cursor: bool,
) -> Page<T> {
    rows.sort_by(|a, b| {
        let key = (a.0, &a.1).cmp(&(b.0, &b.1));
        match order {
            SortOrder::Asc => key,
            SortOrder::Desc => key.reverse(),
        }
    });
    rows.truncate(limit + 1);

    let page = paginate(rows, limit, |(ts, tiebreak, _)| {
        Cursor::new(
            ts.to_string(),
            tiebreak_in_cursor.then(|| tiebreak.clone()),
        )
    });
    Page {
        data: page.data.into_iter().map(|(_, _, row)| row).collect(),
        next_cursor: page.next_cursor,
    }
}

/// In-memory span store.
#[derive(Debug, Default)]
pub struct InMemoryTraceStore {
    spans: RwLock<Vec<Span>>,
}

impl InMemoryTraceStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of stored spans.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn len(&self) -> Result<usize, EngineError> {
        Ok(self.spans.read().map_err(|_| lock_error())?.len())
    }

    /// True when nothing has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, EngineError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl TraceStore for InMemoryTraceStore {
    async fn write_spans(&self, _ctx: &CallContext, spans: Vec<Span>) -> Result<(), EngineError> {
        self.spans.write().map_err(|_| lock_error())?.extend(spans);
        Ok(())
    }

    async fn search_spans(
        &self,
        _ctx: &CallContext,
        filter: &TraceFilter,
        cancel: &CancellationToken,
    ) -> Result<Page<Span>, EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let cursor = parse_cursor(filter.cursor.as_deref())?;
        if let Some(cursor) = &cursor {
            if cursor.tiebreak.is_none() {
                return Err(EngineError::Cursor(
                    "trace cursor requires a span-id tiebreaker".to_string(),
                ));
            }
        }
        validate_filter_keys(&filter.attributes, &filter.resource_attributes)?;

        let start = filter
            .start_nanos
            .as_deref()
            .map(|t| parse_filter_nanos(t, "startNanos"))
            .transpose()?;
        let end = filter
            .end_nanos
            .as_deref()
            .map(|t| parse_filter_nanos(t, "endNanos"))
            .transpose()?;
        let min_duration = filter
            .min_duration_nanos
            .as_deref()
            .map(|t| parse_filter_nanos(t, "minDurationNanos"))
            .transpose()?;
        let max_duration = filter
            .max_duration_nanos
            .as_deref()
            .map(|t| parse_filter_nanos(t, "maxDurationNanos"))
            .transpose()?;

        let spans = self.spans.read().map_err(|_| lock_error())?;
        let matching: Vec<(i128, String, Span)> = spans
            .iter()
            .filter(|span| {
                let ts = entity_nanos(&span.start_time_unix_nano);
                let duration = i128::from(span.duration_nanos().unwrap_or(0));

                filter.trace_id.as_deref().is_none_or(|v| span.trace_id == v)
                    && filter.span_id.as_deref().is_none_or(|v| span.span_id == v)
                    && filter.service.as_deref().is_none_or(|v| span.service == v)
                    && filter.name.as_deref().is_none_or(|v| span.name == v)
                    && filter.kind.is_none_or(|v| span.kind == v)
                    && filter.status.is_none_or(|v| span.status.code == v)
                    && start.is_none_or(|bound| ts >= bound)
                    && end.is_none_or(|bound| ts <= bound)
                    && min_duration.is_none_or(|bound| duration >= bound)
                    && max_duration.is_none_or(|bound| duration <= bound)
                    && attrs_match(span.attributes.as_ref(), &filter.attributes)
                    && attrs_match(
                        Some(&span.resource.attributes),
                        &filter.resource_attributes,
                    )
                    && cursor.as_ref().is_none_or(|c| {
                        beyond_cursor(filter.order, ts, Some(&span.span_id), c)
                    })
            })
            .map(|span| {
                (
                    entity_nanos(&span.start_time_unix_nano),
                    span.span_id.clone(),
                    span.clone(),
                )
            })
            .collect();

        Ok(sort_and_page(
            matching,
            filter.order,
            effective_limit(filter.limit),
            true,
        ))
    }

    async fn find_trace(
        &self,
        _ctx: &CallContext,
        trace_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Span>, EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let spans = self.spans.read().map_err(|_| lock_error())?;
        let mut found: Vec<Span> = spans
            .iter()
            .filter(|span| span.trace_id == trace_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            (entity_nanos(&a.start_time_unix_nano), &a.span_id)
                .cmp(&(entity_nanos(&b.start_time_unix_nano), &b.span_id))
        });
        Ok(found)
    }
}

/// In-memory log store.
#[derive(Debug, Default)]
pub struct InMemoryLogStore {
    records: RwLock<Vec<LogRecord>>,
}

impl InMemoryLogStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl LogStore for InMemoryLogStore {
    async fn write_logs(
        &self,
        _ctx: &CallContext,
        records: Vec<LogRecord>,
    ) -> Result<(), EngineError> {
        self.records
            .write()
            .map_err(|_| lock_error())?
            .extend(records);
        Ok(())
    }

    async fn search_logs(
        &self,
        _ctx: &CallContext,
        filter: &LogFilter,
        cancel: &CancellationToken,
    ) -> Result<Page<LogRecord>, EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let cursor = parse_cursor(filter.cursor.as_deref())?;
        validate_filter_keys(&filter.attributes, &filter.resource_attributes)?;

        let start = filter
            .start_nanos
            .as_deref()
            .map(|t| parse_filter_nanos(t, "startNanos"))
            .transpose()?;
        let end = filter
            .end_nanos
            .as_deref()
            .map(|t| parse_filter_nanos(t, "endNanos"))
            .transpose()?;

        let records = self.records.read().map_err(|_| lock_error())?;
        let matching: Vec<(i128, String, LogRecord)> = records
            .iter()
            .filter(|record| {
                let ts = entity_nanos(&record.time_unix_nano);

                filter.service.as_deref().is_none_or(|v| record.service == v)
                    && filter
                        .trace_id
                        .as_deref()
                        .is_none_or(|v| record.trace_id.as_deref() == Some(v))
                    && filter
                        .span_id
                        .as_deref()
                        .is_none_or(|v| record.span_id.as_deref() == Some(v))
                    && filter
                        .min_severity
                        .is_none_or(|bound| record.severity_number >= bound)
                    && filter
                        .max_severity
                        .is_none_or(|bound| record.severity_number <= bound)
                    && filter
                        .body_contains
                        .as_deref()
                        .is_none_or(|pattern| record.body_text().contains(pattern))
                    && start.is_none_or(|bound| ts >= bound)
                    && end.is_none_or(|bound| ts <= bound)
                    && attrs_match(record.attributes.as_ref(), &filter.attributes)
                    && attrs_match(
                        Some(&record.resource.attributes),
                        &filter.resource_attributes,
                    )
                    // Timestamp-only pagination, as in the logs table.
                    && cursor.as_ref().is_none_or(|c| {
                        beyond_cursor(filter.order, ts, None, c)
                    })
            })
            .map(|record| {
                (
                    entity_nanos(&record.time_unix_nano),
                    String::new(),
                    record.clone(),
                )
            })
            .collect();

        Ok(sort_and_page(
            matching,
            filter.order,
            effective_limit(filter.limit),
            false,
        ))
    }
}

/// In-memory metric store with its discovery index.
#[derive(Debug, Default)]
pub struct InMemoryMetricStore {
    points: RwLock<Vec<MetricPoint>>,
    discovery: Arc<DiscoveryIndex>,
}

impl InMemoryMetricStore {
    /// Creates a new empty store with a fresh discovery index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// The discovery index backing this store.
    #[must_use]
    pub fn discovery(&self) -> Arc<DiscoveryIndex> {
        Arc::clone(&self.discovery)
    }
}

#[async_trait]
impl MetricStore for InMemoryMetricStore {
    async fn write_points(
        &self,
        _ctx: &CallContext,
        points: Vec<MetricPoint>,
    ) -> Result<(), EngineError> {
        self.discovery.update(&points);
        self.points
            .write()
            .map_err(|_| lock_error())?
            .extend(points);
        Ok(())
    }

    async fn search_points(
        &self,
        _ctx: &CallContext,
        filter: &MetricFilter,
        cancel: &CancellationToken,
    ) -> Result<Page<MetricPoint>, EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let cursor = parse_cursor(filter.cursor.as_deref())?;
        if let Some(cursor) = &cursor {
            // Mirror the translator: the metric tiebreaker must be numeric.
            let valid = cursor
                .tiebreak
                .as_deref()
                .is_some_and(|tb| tb.parse::<u64>().is_ok());
            if !valid {
                return Err(EngineError::Cursor(
                    "metric cursor requires a numeric tiebreaker".to_string(),
                ));
            }
        }
        validate_filter_keys(&filter.attributes, &filter.resource_attributes)?;

        let start = filter
            .start_nanos
            .as_deref()
            .map(|t| parse_filter_nanos(t, "startNanos"))
            .transpose()?;
        let end = filter
            .end_nanos
            .as_deref()
            .map(|t| parse_filter_nanos(t, "endNanos"))
            .transpose()?;

        let points = self.points.read().map_err(|_| lock_error())?;
        let matching: Vec<(i128, String, MetricPoint)> = points
            .iter()
            .filter(|point| {
                let ts = entity_nanos(&point.time_unix_nano);

                point.kind() == filter.kind
                    && filter.name.as_deref().is_none_or(|v| point.name == v)
                    && filter.service.as_deref().is_none_or(|v| point.service == v)
                    && filter
                        .unit
                        .as_deref()
                        .is_none_or(|v| point.unit.as_deref() == Some(v))
                    && start.is_none_or(|bound| ts >= bound)
                    && end.is_none_or(|bound| ts <= bound)
                    && attrs_match(point.attributes.as_ref(), &filter.attributes)
                    && attrs_match(
                        Some(&point.resource.attributes),
                        &filter.resource_attributes,
                    )
                    && cursor.as_ref().is_none_or(|c| {
                        beyond_cursor(
                            filter.order,
                            ts,
                            Some(&point_hash_key(point)),
                            c,
                        )
                    })
            })
            .map(|point| {
                (
                    entity_nanos(&point.time_unix_nano),
                    point_hash_key(point),
                    point.clone(),
                )
            })
            .collect();

        Ok(sort_and_page(
            matching,
            filter.order,
            effective_limit(filter.limit),
            true,
        ))
    }

    async fn discover(
        &self,
        _ctx: &CallContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<DiscoveredMetric>, EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(self.discovery.snapshot())
    }
}

/// Zero-padded hash text so lexicographic order equals numeric order.
fn point_hash_key(point: &MetricPoint) -> String {
    format!("{:020}", point.point_hash())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metric::{GaugeData, MetricData, NumberValue};
    use crate::models::value::{CanonicalValue, KeyValuePair, ResourceDesc, ScopeDesc};
    use crate::models::MetricKind;
    use std::collections::BTreeSet;

    fn span(trace: &str, span_id: &str, start: i64) -> Span {
        Span::new(trace, span_id, "op", "svc").with_time_range(
            start.to_string(),
            (start + 100).to_string(),
        )
    }

    fn gauge(name: &str, ts: i64, label: &str) -> MetricPoint {
        MetricPoint {
            name: name.to_string(),
            unit: None,
            description: None,
            service: "svc".to_string(),
            start_time_unix_nano: None,
            time_unix_nano: ts.to_string(),
            attributes: Some(AttributeList::from_pairs(vec![KeyValuePair {
                key: "label".to_string(),
                value: Some(CanonicalValue::String(label.to_string())),
            }])),
            exemplars: Vec::new(),
            data: MetricData::Gauge(GaugeData {
                value: NumberValue::AsDouble(1.0),
                flags: 0,
            }),
            resource: ResourceDesc::default(),
            scope: ScopeDesc::default(),
        }
    }

    #[tokio::test]
    async fn test_pagination_walk_reconstructs_dataset_exactly_once() {
        let store = InMemoryTraceStore::new();
        let ctx = CallContext::new();
        let cancel = CancellationToken::new();

        let spans: Vec<Span> = (0..10)
            .map(|i| span("trace", &format!("{i:016x}"), 1_000 + i))
            .collect();
        store.write_spans(&ctx, spans).await.unwrap();

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;
        loop {
            let mut filter = TraceFilter::new().with_limit(3);
            if let Some(c) = &cursor {
                filter = filter.with_cursor(c.clone());
            }
            let page = store.search_spans(&ctx, &filter, &cancel).await.unwrap();
            seen.extend(page.data.iter().map(|s| s.span_id.clone()));
            pages += 1;
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(pages, 4);
        assert_eq!(seen.len(), 10);
        // Exactly once per row, newest first.
        let unique: BTreeSet<&String> = seen.iter().collect();
        assert_eq!(unique.len(), 10);
        assert_eq!(seen[0], format!("{:016x}", 9));
        assert_eq!(seen[9], format!("{:016x}", 0));
    }

    #[tokio::test]
    async fn test_ascending_walk() {
        let store = InMemoryTraceStore::new();
        let ctx = CallContext::new();
        let cancel = CancellationToken::new();

        store
            .write_spans(&ctx, (0..5).map(|i| span("t", &format!("{i:x}"), i)).collect())
            .await
            .unwrap();

        let filter = TraceFilter::new().with_order(SortOrder::Asc).with_limit(2);
        let first = store.search_spans(&ctx, &filter, &cancel).await.unwrap();
        assert_eq!(first.data[0].span_id, "0");

        let second = store
            .search_spans(
                &ctx,
                &filter.clone().with_cursor(first.next_cursor.unwrap()),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(second.data[0].span_id, "2");
    }

    #[tokio::test]
    async fn test_trace_filters() {
        let store = InMemoryTraceStore::new();
        let ctx = CallContext::new();
        let cancel = CancellationToken::new();

        let mut tagged = span("t1", "a", 100);
        tagged = tagged.with_attribute("http.status_code", CanonicalValue::int(500));
        store
            .write_spans(&ctx, vec![tagged, span("t2", "b", 200)])
            .await
            .unwrap();

        let page = store
            .search_spans(
                &ctx,
                &TraceFilter::new().with_attribute("http.status_code", "500"),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].trace_id, "t1");

        let page = store
            .search_spans(
                &ctx,
                &TraceFilter::new().with_time_range("150", "250"),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].trace_id, "t2");
    }

    #[tokio::test]
    async fn test_invalid_attribute_key_rejected() {
        let store = InMemoryTraceStore::new();
        let ctx = CallContext::new();
        let cancel = CancellationToken::new();

        let result = store
            .search_spans(
                &ctx,
                &TraceFilter::new().with_attribute("bad;key", "v"),
                &cancel,
            )
            .await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_find_trace_ordered_oldest_first() {
        let store = InMemoryTraceStore::new();
        let ctx = CallContext::new();
        let cancel = CancellationToken::new();

        store
            .write_spans(
                &ctx,
                vec![span("t", "late", 300), span("t", "early", 100), span("x", "other", 200)],
            )
            .await
            .unwrap();

        let found = store.find_trace(&ctx, "t", &cancel).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].span_id, "early");
        assert_eq!(found[1].span_id, "late");
    }

    #[tokio::test]
    async fn test_cancellation_surfaces() {
        let store = InMemoryTraceStore::new();
        let ctx = CallContext::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = store
            .search_spans(&ctx, &TraceFilter::new(), &cancel)
            .await;
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }

    #[tokio::test]
    async fn test_log_search_filters_and_cursor() {
        let store = InMemoryLogStore::new();
        let ctx = CallContext::new();
        let cancel = CancellationToken::new();

        let records = vec![
            LogRecord::new("100", "connection timeout", "api").with_severity(17, "ERROR"),
            LogRecord::new("200", "user login", "api").with_severity(9, "INFO"),
            LogRecord::new("300", "another timeout occurred", "worker").with_severity(13, "WARN"),
        ];
        store.write_logs(&ctx, records).await.unwrap();

        let page = store
            .search_logs(
                &ctx,
                &LogFilter::new().with_body_contains("timeout"),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);

        let page = store
            .search_logs(&ctx, &LogFilter::new().with_severity_range(13, 24), &cancel)
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);

        // Cursor walk, descending: 300, then 200, then 100.
        let first = store
            .search_logs(&ctx, &LogFilter::new().with_limit(1), &cancel)
            .await
            .unwrap();
        assert_eq!(first.data[0].time_unix_nano, "300");
        let second = store
            .search_logs(
                &ctx,
                &LogFilter::new()
                    .with_limit(1)
                    .with_cursor(first.next_cursor.unwrap()),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(second.data[0].time_unix_nano, "200");
    }

    #[tokio::test]
    async fn test_metric_pagination_no_pair_repeats_across_pages() {
        let store = InMemoryMetricStore::new();
        let ctx = CallContext::new();
        let cancel = CancellationToken::new();

        // Several points share timestamps; the hash tiebreaker must keep
        // adjacent pages disjoint.
        let mut points = Vec::new();
        for i in 0..9 {
            points.push(gauge("queue.depth", 1_000 + i64::from(i / 3), &format!("p{i}")));
        }
        store.write_points(&ctx, points).await.unwrap();

        let mut seen_pairs = BTreeSet::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut filter = MetricFilter::new(MetricKind::Gauge).with_limit(2);
            if let Some(c) = &cursor {
                filter = filter.with_cursor(c.clone());
            }
            let page = store.search_points(&ctx, &filter, &cancel).await.unwrap();
            for point in &page.data {
                let pair = (point.time_unix_nano.clone(), point.point_hash());
                assert!(seen_pairs.insert(pair), "pair seen twice");
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(seen_pairs.len(), 9);
    }

    #[tokio::test]
    async fn test_metric_search_is_kind_scoped() {
        let store = InMemoryMetricStore::new();
        let ctx = CallContext::new();
        let cancel = CancellationToken::new();

        store
            .write_points(&ctx, vec![gauge("depth", 1, "a")])
            .await
            .unwrap();

        let page = store
            .search_points(&ctx, &MetricFilter::new(MetricKind::Sum), &cancel)
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_discover_reflects_writes() {
        let store = InMemoryMetricStore::new();
        let ctx = CallContext::new();
        let cancel = CancellationToken::new();

        store
            .write_points(
                &ctx,
                vec![gauge("depth", 1, "a"), gauge("depth", 2, "b")],
            )
            .await
            .unwrap();

        let discovered = store.discover(&ctx, &cancel).await.unwrap();
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].name, "depth");
        assert_eq!(
            discovered[0].attributes.values.get("label"),
            Some(&vec!["a".to_string(), "b".to_string()])
        );
    }
}
