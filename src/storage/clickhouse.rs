//! ClickHouse-backed store implementations.
//!
//! Executes the compiled queries from [`crate::query`], binds their
//! parameters in placeholder order, and streams rows back with
//! cancellation checked at every suspension point. Result consumption is
//! bounded: every search carries a SQL LIMIT and [`MAX_RESULT_ROWS`] is a
//! final backstop against a runaway result set.

use crate::discovery::DiscoveryIndex;
use crate::error::EngineError;
use crate::models::metric::MetricIdentity;
use crate::models::{DiscoveredMetric, LogRecord, MetricKind, MetricPoint, Span};
use crate::query::cursor::{paginate, Cursor, Page};
use crate::query::discover::{
    compile_aggregate_probe, compile_attributes_read, compile_identities_read, compile_union_scan,
};
use crate::query::filter::{effective_limit, LogFilter, MetricFilter, TraceFilter};
use crate::query::translate::{
    compile_log_search, compile_metric_search, compile_trace_range_lookup, compile_trace_search,
    compile_trace_spans, metric_table, CompiledQuery, SqlValue, LOGS_TABLE, SPANS_TABLE,
    TRACE_INDEX_TABLE,
};
use crate::storage::context::CallContext;
use crate::storage::row::{
    AttributeValueRow, DiscoveryScanRow, ExponentialHistogramRow, ExponentialHistogramWriteRow,
    GaugeRow, GaugeWriteRow, HistogramRow, HistogramWriteRow, IdentityRow, LogRow, LogWriteRow,
    SpanRow, SpanWriteRow, SumRow, SumWriteRow, SummaryRow, SummaryWriteRow, TraceIndexRow,
    TraceRangeRow,
};
use crate::storage::{LogStore, MetricStore, TraceStore};
use async_trait::async_trait;
use clickhouse::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Backstop on rows consumed from a single query.
pub const MAX_RESULT_ROWS: usize = 1_000_000;

fn bind_params(mut query: clickhouse::query::Query, params: &[SqlValue]) -> clickhouse::query::Query {
    for param in params {
        query = match param {
            SqlValue::Text(value) => query.bind(value.as_str()),
            SqlValue::I64(value) => query.bind(*value),
            SqlValue::U64(value) => query.bind(*value),
        };
    }
    query
}

/// Streams every row of a compiled query, checking cancellation between
/// rows and failing once the row backstop is hit.
async fn fetch_all<T>(
    client: &Client,
    compiled: &CompiledQuery,
    cancel: &CancellationToken,
) -> Result<Vec<T>, EngineError>
where
    T: clickhouse::RowOwned + clickhouse::RowRead,
{
    let query = bind_params(client.query(&compiled.sql), &compiled.params);
    let mut cursor = query.fetch::<T>()?;
    let mut rows = Vec::new();

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!(rows = rows.len(), "storage read cancelled");
                return Err(EngineError::Cancelled);
            }
            next = cursor.next() => match next? {
                Some(row) => {
                    rows.push(row);
                    if rows.len() >= MAX_RESULT_ROWS {
                        return Err(EngineError::Storage(format!(
                            "result exceeded {MAX_RESULT_ROWS} rows"
                        )));
                    }
                }
                None => break,
            }
        }
    }

    Ok(rows)
}

/// ClickHouse-backed span store.
#[derive(Clone)]
pub struct ClickHouseTraceStore {
    client: Arc<Client>,
}

impl ClickHouseTraceStore {
    /// Creates a new store over the given client.
    #[must_use]
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Creates a new store wrapped in an Arc.
    #[must_use]
    pub fn new_shared(client: Arc<Client>) -> Arc<Self> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl TraceStore for ClickHouseTraceStore {
    async fn write_spans(&self, ctx: &CallContext, spans: Vec<Span>) -> Result<(), EngineError> {
        if spans.is_empty() {
            return Ok(());
        }
        let client = ctx.apply(&self.client);

        let mut inserter = client.insert::<SpanWriteRow>(SPANS_TABLE).await?;
        for span in &spans {
            inserter.write(&SpanWriteRow::from_span(span)).await?;
        }
        inserter.end().await?;

        let mut index = client.insert::<TraceIndexRow>(TRACE_INDEX_TABLE).await?;
        for span in &spans {
            index.write(&TraceIndexRow::from_span(span)).await?;
        }
        index.end().await?;

        tracing::debug!(count = spans.len(), "wrote spans");
        Ok(())
    }

    async fn search_spans(
        &self,
        ctx: &CallContext,
        filter: &TraceFilter,
        cancel: &CancellationToken,
    ) -> Result<Page<Span>, EngineError> {
        let limit = effective_limit(filter.limit);
        let compiled = compile_trace_search(filter)?;
        let client = ctx.apply(&self.client);

        let rows: Vec<SpanRow> = fetch_all(&client, &compiled, cancel).await?;
        let spans: Vec<Span> = rows
            .into_iter()
            .map(SpanRow::into_span)
            .collect::<Result<_, _>>()?;

        Ok(paginate(spans, limit, |span| {
            Cursor::new(
                span.start_time_unix_nano.clone(),
                Some(span.span_id.clone()),
            )
        }))
    }

    async fn find_trace(
        &self,
        ctx: &CallContext,
        trace_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Span>, EngineError> {
        let client = ctx.apply(&self.client);

        let range_query = compile_trace_range_lookup(trace_id);
        let ranges: Vec<TraceRangeRow> = fetch_all(&client, &range_query, cancel).await?;
        let range = ranges
            .first()
            .map(|row| (row.first_start.as_str(), row.last_end.as_str()));

        let compiled = compile_trace_spans(trace_id, range);
        let rows: Vec<SpanRow> = fetch_all(&client, &compiled, cancel).await?;
        rows.into_iter().map(SpanRow::into_span).collect()
    }
}

/// ClickHouse-backed log store.
#[derive(Clone)]
pub struct ClickHouseLogStore {
    client: Arc<Client>,
}

impl ClickHouseLogStore {
    /// Creates a new store over the given client.
    #[must_use]
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Creates a new store wrapped in an Arc.
    #[must_use]
    pub fn new_shared(client: Arc<Client>) -> Arc<Self> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl LogStore for ClickHouseLogStore {
    async fn write_logs(
        &self,
        ctx: &CallContext,
        records: Vec<LogRecord>,
    ) -> Result<(), EngineError> {
        if records.is_empty() {
            return Ok(());
        }
        let client = ctx.apply(&self.client);

        let mut inserter = client.insert::<LogWriteRow>(LOGS_TABLE).await?;
        for record in &records {
            inserter.write(&LogWriteRow::from_record(record)).await?;
        }
        inserter.end().await?;

        tracing::debug!(count = records.len(), "wrote log records");
        Ok(())
    }

    async fn search_logs(
        &self,
        ctx: &CallContext,
        filter: &LogFilter,
        cancel: &CancellationToken,
    ) -> Result<Page<LogRecord>, EngineError> {
        let limit = effective_limit(filter.limit);
        let compiled = compile_log_search(filter)?;
        let client = ctx.apply(&self.client);

        let rows: Vec<LogRow> = fetch_all(&client, &compiled, cancel).await?;
        let records: Vec<LogRecord> = rows
            .into_iter()
            .map(LogRow::into_record)
            .collect::<Result<_, _>>()?;

        Ok(paginate(records, limit, |record| {
            Cursor::new(record.time_unix_nano.clone(), None)
        }))
    }
}

/// ClickHouse-backed metric store with its discovery index.
#[derive(Clone)]
pub struct ClickHouseMetricStore {
    client: Arc<Client>,
    discovery: Arc<DiscoveryIndex>,
}

impl ClickHouseMetricStore {
    /// Creates a new store over the given client with a fresh discovery
    /// index.
    #[must_use]
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            discovery: DiscoveryIndex::new_shared(),
        }
    }

    /// Creates a new store wrapped in an Arc.
    #[must_use]
    pub fn new_shared(client: Arc<Client>) -> Arc<Self> {
        Arc::new(Self::new(client))
    }

    /// The discovery index backing this store.
    #[must_use]
    pub fn discovery(&self) -> Arc<DiscoveryIndex> {
        Arc::clone(&self.discovery)
    }

    async fn seed_discovery_from_storage(
        &self,
        client: &Client,
        cancel: &CancellationToken,
    ) -> Result<(), EngineError> {
        let probe = compile_aggregate_probe();
        let aggregate_count: u64 = bind_params(client.query(&probe.sql), &probe.params)
            .fetch_one::<u64>()
            .await?;

        if aggregate_count == 2 {
            tracing::debug!("seeding discovery from aggregate tables");
            let identities: Vec<IdentityRow> =
                fetch_all(client, &compile_identities_read(), cancel).await?;
            for row in identities {
                let identity = parse_identity(&row.name, &row.kind)?;
                self.discovery.record(
                    identity,
                    non_empty(&row.unit),
                    non_empty(&row.description),
                    std::iter::empty(),
                    std::iter::empty(),
                );
            }

            let values: Vec<AttributeValueRow> =
                fetch_all(client, &compile_attributes_read(), cancel).await?;
            for row in values {
                let identity = parse_identity(&row.name, &row.kind)?;
                match row.source.as_str() {
                    "point" => self.discovery.record(
                        identity,
                        None,
                        None,
                        std::iter::once((row.key, row.value)),
                        std::iter::empty(),
                    ),
                    "resource" => self.discovery.record(
                        identity,
                        None,
                        None,
                        std::iter::empty(),
                        std::iter::once((row.key, row.value)),
                    ),
                    other => {
                        tracing::warn!(source = other, "skipping unknown attribute source");
                    }
                }
            }
        } else {
            tracing::debug!("discovery aggregates missing, union-scanning metric tables");
            let rows: Vec<DiscoveryScanRow> =
                fetch_all(client, &compile_union_scan(), cancel).await?;
            for row in rows {
                let identity = parse_identity(&row.name, &row.kind)?;
                self.discovery.record(
                    identity,
                    non_empty(&row.unit),
                    non_empty(&row.description),
                    scan_values(row.attributes),
                    scan_values(row.resource_attributes),
                );
            }
        }

        Ok(())
    }
}

fn parse_identity(name: &str, kind: &str) -> Result<MetricIdentity, EngineError> {
    let kind: MetricKind = kind.parse().map_err(EngineError::Configuration)?;
    Ok(MetricIdentity {
        name: name.to_string(),
        kind,
    })
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Values from stored attribute maps, minus complex values, which were
/// serialized as JSON text and never belong in discovery.
fn scan_values(
    map: std::collections::BTreeMap<String, String>,
) -> impl Iterator<Item = (String, String)> {
    map.into_iter()
        .filter(|(_, value)| !value.starts_with('[') && !value.starts_with('{'))
}

#[async_trait]
impl MetricStore for ClickHouseMetricStore {
    async fn write_points(
        &self,
        ctx: &CallContext,
        points: Vec<MetricPoint>,
    ) -> Result<(), EngineError> {
        if points.is_empty() {
            return Ok(());
        }
        let client = ctx.apply(&self.client);

        use crate::models::metric::MetricData;

        let mut gauges = Vec::new();
        let mut sums = Vec::new();
        let mut histograms = Vec::new();
        let mut exponentials = Vec::new();
        let mut summaries = Vec::new();

        for point in &points {
            match &point.data {
                MetricData::Gauge(data) => gauges.push(GaugeWriteRow::from_point(point, data)),
                MetricData::Sum(data) => sums.push(SumWriteRow::from_point(point, data)),
                MetricData::Histogram(data) => {
                    histograms.push(HistogramWriteRow::from_point(point, data));
                }
                MetricData::ExponentialHistogram(data) => {
                    exponentials.push(ExponentialHistogramWriteRow::from_point(point, data));
                }
                MetricData::Summary(data) => {
                    summaries.push(SummaryWriteRow::from_point(point, data));
                }
            }
        }

        insert_rows(&client, metric_table(MetricKind::Gauge), &gauges).await?;
        insert_rows(&client, metric_table(MetricKind::Sum), &sums).await?;
        insert_rows(&client, metric_table(MetricKind::Histogram), &histograms).await?;
        insert_rows(
            &client,
            metric_table(MetricKind::ExponentialHistogram),
            &exponentials,
        )
        .await?;
        insert_rows(&client, metric_table(MetricKind::Summary), &summaries).await?;

        self.discovery.update(&points);

        tracing::debug!(count = points.len(), "wrote metric points");
        Ok(())
    }

    async fn search_points(
        &self,
        ctx: &CallContext,
        filter: &MetricFilter,
        cancel: &CancellationToken,
    ) -> Result<Page<MetricPoint>, EngineError> {
        let limit = effective_limit(filter.limit);
        let compiled = compile_metric_search(filter)?;
        let client = ctx.apply(&self.client);

        // Each kind reads through its own row type; the stored point_hash
        // rides along for cursor derivation.
        let keyed: Vec<(MetricPoint, u64)> = match filter.kind {
            MetricKind::Gauge => fetch_all::<GaugeRow>(&client, &compiled, cancel)
                .await?
                .into_iter()
                .map(|row| {
                    let hash = row.point_hash();
                    row.into_point().map(|point| (point, hash))
                })
                .collect::<Result<_, _>>()?,
            MetricKind::Sum => fetch_all::<SumRow>(&client, &compiled, cancel)
                .await?
                .into_iter()
                .map(|row| {
                    let hash = row.point_hash();
                    row.into_point().map(|point| (point, hash))
                })
                .collect::<Result<_, _>>()?,
            MetricKind::Histogram => fetch_all::<HistogramRow>(&client, &compiled, cancel)
                .await?
                .into_iter()
                .map(|row| {
                    let hash = row.point_hash();
                    row.into_point().map(|point| (point, hash))
                })
                .collect::<Result<_, _>>()?,
            MetricKind::ExponentialHistogram => {
                fetch_all::<ExponentialHistogramRow>(&client, &compiled, cancel)
                    .await?
                    .into_iter()
                    .map(|row| {
                        let hash = row.point_hash();
                        row.into_point().map(|point| (point, hash))
                    })
                    .collect::<Result<_, _>>()?
            }
            MetricKind::Summary => fetch_all::<SummaryRow>(&client, &compiled, cancel)
                .await?
                .into_iter()
                .map(|row| {
                    let hash = row.point_hash();
                    row.into_point().map(|point| (point, hash))
                })
                .collect::<Result<_, _>>()?,
        };

        let page = paginate(keyed, limit, |(point, hash)| {
            Cursor::new(point.time_unix_nano.clone(), Some(hash.to_string()))
        });

        Ok(Page {
            data: page.data.into_iter().map(|(point, _)| point).collect(),
            next_cursor: page.next_cursor,
        })
    }

    async fn discover(
        &self,
        ctx: &CallContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<DiscoveredMetric>, EngineError> {
        if self.discovery.is_empty() {
            let client = ctx.apply(&self.client);
            self.seed_discovery_from_storage(&client, cancel).await?;
        }
        Ok(self.discovery.snapshot())
    }
}

async fn insert_rows<T>(client: &Client, table: &str, rows: &[T]) -> Result<(), EngineError>
where
    T: clickhouse::RowOwned + clickhouse::RowWrite,
{
    if rows.is_empty() {
        return Ok(());
    }
    let mut inserter = client.insert::<T>(table).await?;
    for row in rows {
        inserter.write(row).await?;
    }
    inserter.end().await?;
    Ok(())
}
