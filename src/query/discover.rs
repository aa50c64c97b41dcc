//! Discovery query compilation.
//!
//! Discovery reads take one of two shapes. The fast path reads two
//! precomputed aggregate tables; the slow path union-scans every
//! metric-kind table and lets the caller fold the rows. A metadata probe
//! decides which path applies on each call, so a missing aggregate table
//! only costs performance, never correctness.

use crate::discovery::MAX_DISCOVERY_VALUES;
use crate::models::MetricKind;
use crate::query::translate::{metric_table, CompiledQuery};

/// The aggregate table of known metric identities.
pub const IDENTITIES_TABLE: &str = "metric_identities";
/// The aggregate table of per-identity attribute values.
pub const ATTRIBUTES_TABLE: &str = "metric_attributes";

/// Row cap for the slow union scan, applied per kind table.
pub const MAX_DISCOVERY_SCAN_ROWS: usize = 100_000;

/// Compiles the metadata probe: how many of the two aggregate tables
/// exist in the active database. Both present (a count of 2) enables the
/// fast path.
#[must_use]
pub fn compile_aggregate_probe() -> CompiledQuery {
    CompiledQuery {
        sql: format!(
            "SELECT count() FROM system.tables WHERE database = currentDatabase() \
             AND name IN ('{IDENTITIES_TABLE}', '{ATTRIBUTES_TABLE}')"
        ),
        params: Vec::new(),
    }
}

/// Compiles the fast-path identity read.
#[must_use]
pub fn compile_identities_read() -> CompiledQuery {
    CompiledQuery {
        sql: format!(
            "SELECT name, kind, anyLast(unit) AS unit, anyLast(description) AS description \
             FROM {IDENTITIES_TABLE} GROUP BY name, kind"
        ),
        params: Vec::new(),
    }
}

/// Compiles the fast-path attribute-value read.
///
/// `LIMIT n BY` keeps one row per distinct value up to one past the
/// truncation cap per (identity, source, key), so the fold can tell a
/// full set from a truncated one without pulling every value.
#[must_use]
pub fn compile_attributes_read() -> CompiledQuery {
    let probe = MAX_DISCOVERY_VALUES + 1;
    CompiledQuery {
        sql: format!(
            "SELECT name, kind, source, key, value FROM {ATTRIBUTES_TABLE} \
             GROUP BY name, kind, source, key, value \
             LIMIT {probe} BY name, kind, source, key"
        ),
        params: Vec::new(),
    }
}

/// Compiles the slow-path union scan over every metric-kind table.
///
/// Each arm projects the same identity and attribute columns; the caller
/// folds the distinct rows into discovered metrics. Bounded per table so
/// a huge backlog cannot stream unbounded rows into the fold.
#[must_use]
pub fn compile_union_scan() -> CompiledQuery {
    let arms: Vec<String> = MetricKind::ALL
        .iter()
        .map(|kind| {
            format!(
                "SELECT DISTINCT name, '{kind}' AS kind, unit, description, attributes, \
                 resource_attributes FROM {table} LIMIT {MAX_DISCOVERY_SCAN_ROWS}",
                table = metric_table(*kind),
            )
        })
        .collect();

    CompiledQuery {
        sql: arms.join(" UNION ALL "),
        params: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_checks_both_aggregates() {
        let probe = compile_aggregate_probe();
        assert!(probe.sql.contains("metric_identities"));
        assert!(probe.sql.contains("metric_attributes"));
        assert!(probe.params.is_empty());
    }

    #[test]
    fn test_attribute_read_probes_one_past_cap() {
        let compiled = compile_attributes_read();
        assert!(compiled.sql.contains("LIMIT 101 BY name, kind, source, key"));
    }

    #[test]
    fn test_union_scan_covers_every_kind() {
        let compiled = compile_union_scan();
        for kind in MetricKind::ALL {
            assert!(compiled.sql.contains(metric_table(kind)), "{kind}");
        }
        assert_eq!(compiled.sql.matches("UNION ALL").count(), 4);
    }
}
