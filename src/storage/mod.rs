//! Storage traits and engines.
//!
//! Per-signal store traits with two engines behind them: ClickHouse for
//! production and an in-memory engine with identical filter, ordering,
//! cursor, and discovery semantics for development and tests. All I/O is
//! async and cancelable through a caller-supplied token; cancellation is
//! honored at every row-stream suspension point.

pub mod clickhouse;
pub mod context;
pub mod memory;
pub mod row;
pub mod schema;

pub use self::clickhouse::{ClickHouseLogStore, ClickHouseMetricStore, ClickHouseTraceStore};
pub use context::{CallContext, ConnectOptions};
pub use memory::{InMemoryLogStore, InMemoryMetricStore, InMemoryTraceStore};

use crate::error::EngineError;
use crate::models::{DiscoveredMetric, LogRecord, MetricPoint, Span};
use crate::query::cursor::Page;
use crate::query::filter::{LogFilter, MetricFilter, TraceFilter};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Trait for span storage implementations.
#[async_trait]
pub trait TraceStore: Send + Sync {
    /// Writes a batch of validated spans.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails. The batch is
    /// all-or-nothing; no per-span rejection happens here.
    async fn write_spans(&self, ctx: &CallContext, spans: Vec<Span>) -> Result<(), EngineError>;

    /// Searches spans with cursor pagination.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed filters or cursors, on storage
    /// failure, or when `cancel` fires mid-read.
    async fn search_spans(
        &self,
        ctx: &CallContext,
        filter: &TraceFilter,
        cancel: &CancellationToken,
    ) -> Result<Page<Span>, EngineError>;

    /// Fetches every span of one trace, oldest first, using the trace-id
    /// lookup table to narrow the scan.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or cancellation.
    async fn find_trace(
        &self,
        ctx: &CallContext,
        trace_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Span>, EngineError>;
}

/// Trait for log storage implementations.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Writes a batch of validated log records.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn write_logs(&self, ctx: &CallContext, records: Vec<LogRecord>)
        -> Result<(), EngineError>;

    /// Searches log records with cursor pagination.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed filters or cursors, on storage
    /// failure, or when `cancel` fires mid-read.
    async fn search_logs(
        &self,
        ctx: &CallContext,
        filter: &LogFilter,
        cancel: &CancellationToken,
    ) -> Result<Page<LogRecord>, EngineError>;
}

/// Trait for metric storage implementations.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Writes a batch of validated metric points and feeds the discovery
    /// index.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn write_points(
        &self,
        ctx: &CallContext,
        points: Vec<MetricPoint>,
    ) -> Result<(), EngineError>;

    /// Searches metric points of one kind with cursor pagination.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed filters or cursors, on storage
    /// failure, or when `cancel` fires mid-read.
    async fn search_points(
        &self,
        ctx: &CallContext,
        filter: &MetricFilter,
        cancel: &CancellationToken,
    ) -> Result<Page<MetricPoint>, EngineError>;

    /// Lists every known metric identity with its observed attributes.
    ///
    /// Served from the discovery index when it is warm; a cold index is
    /// seeded from storage first (aggregate tables when present, union
    /// scan otherwise).
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or cancellation.
    async fn discover(
        &self,
        ctx: &CallContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<DiscoveredMetric>, EngineError>;
}
