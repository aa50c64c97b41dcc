//! Discovery index.
//!
//! An in-process, append-only aggregate of every metric identity the
//! engine has written, with the attribute values observed for each. One
//! instance exists per storage engine; every metric write merges into it
//! concurrently with discovery reads. The map is keyed per identity, so
//! merges into different identities never contend and a reader never
//! observes a single identity mid-merge. Entries are never evicted: the
//! index trades memory for not rescanning storage on every discovery call.

use crate::models::metric::{AttributeSummary, DiscoveredMetric, MetricIdentity, MetricPoint};
use crate::models::value::AttributeList;
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Cap on attribute values reported per key. Applied when reading a
/// snapshot; live sets keep growing past it.
pub const MAX_DISCOVERY_VALUES: usize = 100;

#[derive(Debug, Default)]
struct IdentityEntry {
    unit: Option<String>,
    description: Option<String>,
    attributes: BTreeMap<String, BTreeSet<String>>,
    resource_attributes: BTreeMap<String, BTreeSet<String>>,
}

impl IdentityEntry {
    fn merge(
        &mut self,
        unit: Option<&str>,
        description: Option<&str>,
        attributes: impl Iterator<Item = (String, String)>,
        resource_attributes: impl Iterator<Item = (String, String)>,
    ) {
        // Descriptive metadata is first-write-wins.
        if self.unit.is_none() {
            self.unit = unit.map(str::to_string);
        }
        if self.description.is_none() {
            self.description = description.map(str::to_string);
        }
        for (key, value) in attributes {
            self.attributes.entry(key).or_default().insert(value);
        }
        for (key, value) in resource_attributes {
            self.resource_attributes.entry(key).or_default().insert(value);
        }
    }
}

/// The incremental index of metric identities and attribute values.
#[derive(Debug, Default)]
pub struct DiscoveryIndex {
    entries: DashMap<MetricIdentity, IdentityEntry>,
}

impl DiscoveryIndex {
    /// Creates a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new index wrapped in an Arc for sharing with writers.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Merges a batch of metric points into the index.
    ///
    /// Each point's own attributes and its resource attributes are folded
    /// into the owning identity's value sets. Only scalar values are
    /// recorded; arrays and kvlists are skipped.
    pub fn update(&self, points: &[MetricPoint]) {
        for point in points {
            self.record(
                point.identity(),
                point.unit.as_deref(),
                point.description.as_deref(),
                scalar_entries(point.attributes.as_ref()),
                scalar_entries(Some(&point.resource.attributes)),
            );
        }
    }

    /// Merges one observation of an identity.
    ///
    /// The merge runs under the identity's map entry, so concurrent
    /// writers to the same identity serialize and readers never see a
    /// partial merge.
    pub fn record(
        &self,
        identity: MetricIdentity,
        unit: Option<&str>,
        description: Option<&str>,
        attributes: impl Iterator<Item = (String, String)>,
        resource_attributes: impl Iterator<Item = (String, String)>,
    ) {
        let mut entry = self.entries.entry(identity).or_default();
        entry.merge(unit, description, attributes, resource_attributes);
    }

    /// Emits a discovered metric for every known identity, sorted by name
    /// then kind.
    ///
    /// Value lists are truncated to [`MAX_DISCOVERY_VALUES`] here, at read
    /// time, with a group-level flag; the live sets are never trimmed, so
    /// two snapshots may disagree about which values survive if the index
    /// grew in between.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DiscoveredMetric> {
        let mut metrics: Vec<DiscoveredMetric> = self
            .entries
            .iter()
            .map(|entry| DiscoveredMetric {
                name: entry.key().name.clone(),
                kind: entry.key().kind,
                unit: entry.value().unit.clone(),
                description: entry.value().description.clone(),
                attributes: summarize(&entry.value().attributes),
                resource_attributes: summarize(&entry.value().resource_attributes),
            })
            .collect();

        metrics.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.kind.cmp(&b.kind)));
        metrics
    }

    /// Returns true when no identity has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of known identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn scalar_entries(
    attributes: Option<&AttributeList>,
) -> impl Iterator<Item = (String, String)> + '_ {
    attributes
        .into_iter()
        .flat_map(AttributeList::iter)
        .filter_map(|(key, value)| value.discovery_text().map(|text| (key.to_string(), text)))
}

fn summarize(values: &BTreeMap<String, BTreeSet<String>>) -> AttributeSummary {
    let truncated = values.values().any(|set| set.len() > MAX_DISCOVERY_VALUES);
    AttributeSummary {
        values: values
            .iter()
            .map(|(key, set)| {
                (
                    key.clone(),
                    set.iter().take(MAX_DISCOVERY_VALUES).cloned().collect(),
                )
            })
            .collect(),
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metric::{GaugeData, MetricData, NumberValue};
    use crate::models::value::{
        CanonicalValue, KeyValuePair, ResourceDesc, ScopeDesc, ValueList,
    };
    use crate::models::MetricKind;

    fn point(name: &str, attrs: Vec<(&str, CanonicalValue)>) -> MetricPoint {
        MetricPoint {
            name: name.to_string(),
            unit: Some("ms".to_string()),
            description: Some("latency".to_string()),
            service: "svc".to_string(),
            start_time_unix_nano: None,
            time_unix_nano: "1".to_string(),
            attributes: if attrs.is_empty() {
                None
            } else {
                Some(AttributeList::from_pairs(
                    attrs
                        .into_iter()
                        .map(|(key, value)| KeyValuePair {
                            key: key.to_string(),
                            value: Some(value),
                        })
                        .collect(),
                ))
            },
            exemplars: Vec::new(),
            data: MetricData::Gauge(GaugeData {
                value: NumberValue::AsDouble(1.0),
                flags: 0,
            }),
            resource: ResourceDesc::default(),
            scope: ScopeDesc::default(),
        }
    }

    #[test]
    fn test_first_sight_creates_identity() {
        let index = DiscoveryIndex::new();
        assert!(index.is_empty());

        index.update(&[point("latency", vec![])]);
        assert_eq!(index.len(), 1);

        let snapshot = index.snapshot();
        assert_eq!(snapshot[0].name, "latency");
        assert_eq!(snapshot[0].kind, MetricKind::Gauge);
        assert_eq!(snapshot[0].unit.as_deref(), Some("ms"));
    }

    #[test]
    fn test_unit_and_description_first_write_wins() {
        let index = DiscoveryIndex::new();
        index.update(&[point("latency", vec![])]);

        let mut changed = point("latency", vec![]);
        changed.unit = Some("s".to_string());
        changed.description = Some("other".to_string());
        index.update(&[changed]);

        let snapshot = index.snapshot();
        assert_eq!(snapshot[0].unit.as_deref(), Some("ms"));
        assert_eq!(snapshot[0].description.as_deref(), Some("latency"));
    }

    #[test]
    fn test_complex_values_are_skipped() {
        let index = DiscoveryIndex::new();
        index.update(&[point(
            "latency",
            vec![
                ("region", CanonicalValue::String("eu-1".to_string())),
                (
                    "shards",
                    CanonicalValue::Array(ValueList {
                        values: vec![CanonicalValue::int(1)],
                    }),
                ),
            ],
        )]);

        let snapshot = index.snapshot();
        assert_eq!(
            snapshot[0].attributes.values.get("region"),
            Some(&vec!["eu-1".to_string()])
        );
        assert!(!snapshot[0].attributes.values.contains_key("shards"));
    }

    #[test]
    fn test_truncation_at_read_time() {
        let index = DiscoveryIndex::new();
        for i in 0..150 {
            index.update(&[point(
                "latency",
                vec![("pod", CanonicalValue::String(format!("pod-{i:03}")))],
            )]);
        }

        let snapshot = index.snapshot();
        let values = snapshot[0].attributes.values.get("pod").unwrap();
        assert_eq!(values.len(), MAX_DISCOVERY_VALUES);
        assert!(snapshot[0].attributes.truncated);
        // The resource group is independent and untruncated.
        assert!(!snapshot[0].resource_attributes.truncated);
    }

    #[test]
    fn test_no_flag_at_or_below_cap() {
        let index = DiscoveryIndex::new();
        for i in 0..MAX_DISCOVERY_VALUES {
            index.update(&[point(
                "latency",
                vec![("pod", CanonicalValue::String(format!("pod-{i:03}")))],
            )]);
        }

        let snapshot = index.snapshot();
        assert_eq!(
            snapshot[0].attributes.values.get("pod").unwrap().len(),
            MAX_DISCOVERY_VALUES
        );
        assert!(!snapshot[0].attributes.truncated);
    }

    #[test]
    fn test_snapshot_sorted_by_identity() {
        let index = DiscoveryIndex::new();
        index.update(&[point("zeta", vec![]), point("alpha", vec![])]);

        let snapshot = index.snapshot();
        let names: Vec<&str> = snapshot.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_concurrent_merges_lose_nothing() {
        let index = DiscoveryIndex::new_shared();
        let mut handles = Vec::new();

        for t in 0..8 {
            let index = Arc::clone(&index);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    index.update(&[point(
                        "latency",
                        vec![(
                            "worker",
                            CanonicalValue::String(format!("t{t}-i{i}")),
                        )],
                    )]);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.len(), 1);
        let entry = index.entries.get(&MetricIdentity {
            name: "latency".to_string(),
            kind: MetricKind::Gauge,
        });
        assert_eq!(
            entry.unwrap().attributes.get("worker").unwrap().len(),
            8 * 50
        );
    }
}
