//! Persisted layout for the ClickHouse engine.
//!
//! One table per signal, one per metric kind, and a trace-id to time-range
//! lookup table. Attribute maps are `Map(String, String)` columns holding
//! stringified scalars; array-shaped payloads (events, links, buckets,
//! exemplars) are serialized text. Two optional aggregate tables, kept
//! current by materialized views, accelerate discovery; their absence only
//! degrades discovery to the union scan.

use crate::models::MetricKind;
use crate::query::discover::{ATTRIBUTES_TABLE, IDENTITIES_TABLE};
use crate::query::translate::{metric_table, LOGS_TABLE, SPANS_TABLE, TRACE_INDEX_TABLE};

/// Shared column block of every metric-kind table.
const METRIC_SHARED_COLUMNS: &str = "\
    time DateTime64(9, 'UTC'),
    start_time DateTime64(9, 'UTC') DEFAULT toDateTime64(0, 9, 'UTC'),
    name String,
    service LowCardinality(String),
    unit String,
    description String,
    attributes Map(String, String),
    resource_attributes Map(String, String),
    scope_name String,
    scope_version String,
    point_hash UInt64,
    flags UInt32";

/// Statements creating the core tables, in dependency order.
#[must_use]
pub fn core_ddl() -> Vec<String> {
    let mut ddl = vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {SPANS_TABLE} (
    start_time DateTime64(9, 'UTC'),
    end_time DateTime64(9, 'UTC'),
    trace_id String,
    span_id String,
    parent_span_id String,
    name String,
    service LowCardinality(String),
    kind LowCardinality(String),
    status_code LowCardinality(String),
    status_message String,
    attributes Map(String, String),
    resource_attributes Map(String, String),
    scope_name String,
    scope_version String,
    events String,
    links String
) ENGINE = MergeTree ORDER BY (start_time, span_id)"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {TRACE_INDEX_TABLE} (
    trace_id String,
    start_time DateTime64(9, 'UTC'),
    end_time DateTime64(9, 'UTC')
) ENGINE = MergeTree ORDER BY trace_id"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {LOGS_TABLE} (
    timestamp DateTime64(9, 'UTC'),
    observed_timestamp DateTime64(9, 'UTC') DEFAULT toDateTime64(0, 9, 'UTC'),
    severity_number Int32,
    severity_text String,
    level LowCardinality(String),
    body String,
    body_value String,
    service LowCardinality(String),
    trace_id String,
    span_id String,
    attributes Map(String, String),
    resource_attributes Map(String, String),
    scope_name String,
    scope_version String
) ENGINE = MergeTree ORDER BY timestamp"
        ),
    ];

    for kind in MetricKind::ALL {
        ddl.push(metric_table_ddl(kind));
    }

    ddl
}

fn metric_table_ddl(kind: MetricKind) -> String {
    let kind_columns = match kind {
        MetricKind::Gauge => {
            "    exemplars String,
    value_double Float64,
    value_int String"
        }
        MetricKind::Sum => {
            "    exemplars String,
    value_double Float64,
    value_int String,
    monotonic Bool"
        }
        MetricKind::Histogram => {
            "    exemplars String,
    count UInt64,
    sum_value Nullable(Float64),
    min_value Nullable(Float64),
    max_value Nullable(Float64),
    bucket_counts String,
    explicit_bounds String"
        }
        MetricKind::ExponentialHistogram => {
            "    exemplars String,
    count UInt64,
    sum_value Nullable(Float64),
    min_value Nullable(Float64),
    max_value Nullable(Float64),
    scale Int32,
    zero_count UInt64,
    zero_threshold Float64,
    positive_offset Int32,
    positive_buckets String,
    negative_offset Int32,
    negative_buckets String"
        }
        MetricKind::Summary => {
            "    count UInt64,
    sum_value Float64,
    quantiles String"
        }
    };

    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
{METRIC_SHARED_COLUMNS},
{kind_columns}
) ENGINE = MergeTree ORDER BY (name, time, point_hash)",
        table = metric_table(kind),
    )
}

/// Statements creating the optional discovery aggregates and the
/// materialized views that keep them current. Skipping these leaves
/// discovery on the union-scan path.
#[must_use]
pub fn aggregate_ddl() -> Vec<String> {
    let mut ddl = vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {IDENTITIES_TABLE} (
    name String,
    kind LowCardinality(String),
    unit String,
    description String
) ENGINE = ReplacingMergeTree ORDER BY (name, kind)"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {ATTRIBUTES_TABLE} (
    name String,
    kind LowCardinality(String),
    source LowCardinality(String),
    key String,
    value String
) ENGINE = ReplacingMergeTree ORDER BY (name, kind, source, key, value)"
        ),
    ];

    for kind in MetricKind::ALL {
        let table = metric_table(kind);
        ddl.push(format!(
            "CREATE MATERIALIZED VIEW IF NOT EXISTS {table}_identity_mv \
             TO {IDENTITIES_TABLE} AS \
             SELECT name, '{kind}' AS kind, unit, description FROM {table}"
        ));
        ddl.push(format!(
            "CREATE MATERIALIZED VIEW IF NOT EXISTS {table}_attrs_mv \
             TO {ATTRIBUTES_TABLE} AS \
             SELECT name, '{kind}' AS kind, 'point' AS source, key, value FROM {table} \
             ARRAY JOIN mapKeys(attributes) AS key, mapValues(attributes) AS value"
        ));
        ddl.push(format!(
            "CREATE MATERIALIZED VIEW IF NOT EXISTS {table}_resource_attrs_mv \
             TO {ATTRIBUTES_TABLE} AS \
             SELECT name, '{kind}' AS kind, 'resource' AS source, key, value FROM {table} \
             ARRAY JOIN mapKeys(resource_attributes) AS key, \
             mapValues(resource_attributes) AS value"
        ));
    }

    ddl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_ddl_covers_all_tables() {
        let ddl = core_ddl();
        // spans + trace_index + logs + five metric kinds.
        assert_eq!(ddl.len(), 8);
        let joined = ddl.join("\n");
        for kind in MetricKind::ALL {
            assert!(joined.contains(metric_table(kind)), "{kind}");
        }
        assert!(joined.contains("ORDER BY (start_time, span_id)"));
    }

    #[test]
    fn test_summary_table_has_no_exemplars_column() {
        let ddl = metric_table_ddl(MetricKind::Summary);
        assert!(!ddl.contains("exemplars"));
        assert!(ddl.contains("quantiles"));
    }

    #[test]
    fn test_aggregate_ddl_is_self_contained() {
        let ddl = aggregate_ddl();
        // Two tables plus three views per kind.
        assert_eq!(ddl.len(), 2 + 3 * MetricKind::ALL.len());
        assert!(ddl[0].contains("ReplacingMergeTree"));
    }
}
