use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;
use vigil_core::{is_sentinel, CanonicalRecord, IdentifierKind, NetworkSignal};
use vigil_rules::NetworkScoring;

/// Records sharing one normalized identifier value under one kind.
#[derive(Debug, Clone, Serialize)]
pub struct IdentifierCluster {
    pub kind: IdentifierKind,
    pub value: String,
    /// Record indices in discovery order.
    pub members: Vec<usize>,
}

impl IdentifierCluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_shared(&self) -> bool {
        self.members.len() > 1
    }

    fn link_text(&self) -> String {
        format!(
            "Linked via {} ({}) to {} other entity(s)",
            self.kind,
            self.value,
            self.members.len() - 1
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphStats {
    pub record_count: usize,
    /// Distinct (kind, value) pairs seen, shared or not.
    pub cluster_count: usize,
    pub shared_cluster_count: usize,
    pub shared_clusters_by_kind: BTreeMap<String, usize>,
    pub largest_cluster: usize,
    /// Records belonging to at least one shared cluster.
    pub linked_records: usize,
}

/// Equivalence classes over identifier values. No closure across kinds.
pub struct IdentityGraph {
    record_count: usize,
    /// Ordered by kind, then by first member.
    clusters: Vec<IdentifierCluster>,
    key_index: HashMap<(IdentifierKind, String), usize>,
}

impl IdentityGraph {
    pub fn new(record_count: usize) -> Self {
        Self {
            record_count,
            clusters: Vec::new(),
            key_index: HashMap::new(),
        }
    }

    pub fn build(records: &[CanonicalRecord]) -> Self {
        let mut graph = Self::new(records.len());
        for kind in IdentifierKind::ALL {
            for (idx, record) in records.iter().enumerate() {
                for value in record.identifier_values(kind) {
                    graph.add_member(kind, value, idx);
                }
            }
        }
        graph
    }

    /// Register `record` under `(kind, value)`. Sentinel values are ignored.
    pub fn add_member(&mut self, kind: IdentifierKind, value: &str, record: usize) {
        if is_sentinel(value) {
            return;
        }
        let lookup = (kind, value.to_string());
        if let Some(&existing) = self.key_index.get(&lookup) {
            self.clusters[existing].members.push(record);
            return;
        }
        self.clusters.push(IdentifierCluster {
            kind,
            value: value.to_string(),
            members: vec![record],
        });
        self.key_index.insert(lookup, self.clusters.len() - 1);
    }

    pub fn shared_clusters(&self) -> impl Iterator<Item = &IdentifierCluster> {
        self.clusters.iter().filter(|c| c.is_shared())
    }

    /// Per-record network signals, parallel to the records the graph was built from.
    pub fn signals(&self, scoring: &NetworkScoring) -> Vec<NetworkSignal> {
        let mut signals = vec![NetworkSignal::default(); self.record_count];
        for cluster in self.shared_clusters() {
            let score = scoring.cluster_score(cluster.size());
            let link = cluster.link_text();
            for &member in &cluster.members {
                if let Some(signal) = signals.get_mut(member) {
                    signal.score = signal.score.max(score);
                    signal.links.push(link.clone());
                }
            }
        }
        signals
    }

    pub fn stats(&self) -> GraphStats {
        let mut shared_clusters_by_kind: BTreeMap<String, usize> = BTreeMap::new();
        let mut linked = vec![false; self.record_count];
        let mut largest_cluster = 0;

        for cluster in self.shared_clusters() {
            *shared_clusters_by_kind
                .entry(cluster.kind.to_string())
                .or_default() += 1;
            largest_cluster = largest_cluster.max(cluster.size());
            for &m in &cluster.members {
                if let Some(flag) = linked.get_mut(m) {
                    *flag = true;
                }
            }
        }

        GraphStats {
            record_count: self.record_count,
            cluster_count: self.clusters.len(),
            shared_cluster_count: shared_clusters_by_kind.values().sum(),
            shared_clusters_by_kind,
            largest_cluster,
            linked_records: linked.iter().filter(|l| **l).count(),
        }
    }
}

/// Build the graph over `records` and score every record.
pub fn analyze(
    records: &[CanonicalRecord],
    scoring: &NetworkScoring,
) -> (Vec<NetworkSignal>, GraphStats) {
    let graph = IdentityGraph::build(records);
    let signals = graph.signals(scoring);
    let stats = graph.stats();
    debug!(
        clusters = stats.shared_cluster_count,
        linked = stats.linked_records,
        largest = stats.largest_cluster,
        "identity graph built"
    );
    (signals, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::collections::BTreeMap;

    fn record(ids: &[(IdentifierKind, &str)]) -> CanonicalRecord {
        CanonicalRecord {
            entity: "e".into(),
            department: "d".into(),
            amount: 1.0,
            identifiers: ids.iter().fold(BTreeMap::new(), |mut map, (k, v)| {
                map.entry(*k).or_insert_with(Vec::new).push(v.to_string());
                map
            }),
            extra: IndexMap::new(),
        }
    }

    #[test]
    fn shared_phone_pair() {
        let records = vec![
            record(&[(IdentifierKind::Phone, "9999999999")]),
            record(&[(IdentifierKind::Phone, "9999999999")]),
            record(&[(IdentifierKind::Phone, "8888888888")]),
        ];
        let (signals, stats) = analyze(&records, &NetworkScoring::default());

        for s in &signals[..2] {
            assert_eq!(s.score, 50);
            assert_eq!(
                s.links,
                vec!["Linked via PHONE (9999999999) to 1 other entity(s)".to_string()]
            );
        }
        assert_eq!(signals[2], NetworkSignal::default());
        assert_eq!(stats.shared_cluster_count, 1);
        assert_eq!(stats.cluster_count, 2);
        assert_eq!(stats.linked_records, 2);
    }

    #[test]
    fn cluster_score_grows_with_size_and_caps() {
        let records: Vec<_> = (0..9)
            .map(|_| record(&[(IdentifierKind::BankAccount, "acc-1")]))
            .collect();
        let (signals, stats) = analyze(&records, &NetworkScoring::default());
        assert!(signals.iter().all(|s| s.score == 100));
        assert!(signals[0].links[0].ends_with("to 8 other entity(s)"));
        assert_eq!(stats.largest_cluster, 9);
    }

    #[test]
    fn sentinels_never_cluster() {
        let records = vec![
            record(&[(IdentifierKind::Mobile, "unknown")]),
            record(&[(IdentifierKind::Mobile, "unknown")]),
            record(&[(IdentifierKind::Mobile, "nan")]),
            record(&[(IdentifierKind::Mobile, "nan")]),
        ];
        let (signals, stats) = analyze(&records, &NetworkScoring::default());
        assert!(signals.iter().all(|s| s.score == 0 && s.links.is_empty()));
        assert_eq!(stats.cluster_count, 0);
    }

    #[test]
    fn max_score_and_links_in_kind_order() {
        let records = vec![
            record(&[
                (IdentifierKind::Address, "1 main st"),
                (IdentifierKind::BankAccount, "b1"),
            ]),
            record(&[
                (IdentifierKind::Address, "1 main st"),
                (IdentifierKind::BankAccount, "b1"),
            ]),
            record(&[(IdentifierKind::Address, "1 main st")]),
        ];
        let (signals, _) = analyze(&records, &NetworkScoring::default());

        // Address cluster of 3 scores 60, bank cluster of 2 scores 50.
        assert_eq!(signals[0].score, 60);
        assert_eq!(signals[0].links.len(), 2);
        assert!(signals[0].links[0].starts_with("Linked via BANK ACCOUNT (b1)"));
        assert!(signals[0].links[1].starts_with("Linked via ADDRESS (1 main st)"));
        assert_eq!(signals[2].score, 60);
        assert_eq!(signals[2].links.len(), 1);
    }

    #[test]
    fn no_closure_across_kinds() {
        // 0-1 share a phone, 1-2 share a pan; 0 and 2 stay unlinked.
        let records = vec![
            record(&[(IdentifierKind::Phone, "p")]),
            record(&[(IdentifierKind::Phone, "p"), (IdentifierKind::NationalId, "x")]),
            record(&[(IdentifierKind::NationalId, "x")]),
        ];
        let graph = IdentityGraph::build(&records);
        let shared: Vec<_> = graph
            .shared_clusters()
            .map(|c| (c.kind, c.members.clone()))
            .collect();
        assert_eq!(
            shared,
            vec![
                (IdentifierKind::Phone, vec![0, 1]),
                (IdentifierKind::NationalId, vec![1, 2]),
            ]
        );

        let signals = graph.signals(&NetworkScoring::default());
        assert!(signals.iter().all(|s| s.score == 50));
        assert_eq!(signals[1].links.len(), 2);
    }

    #[test]
    fn every_value_of_a_kind_joins_its_cluster() {
        // Each record carries two national ids; only the second is shared.
        let records = vec![
            record(&[
                (IdentifierKind::NationalId, "111"),
                (IdentifierKind::NationalId, "panx"),
            ]),
            record(&[
                (IdentifierKind::NationalId, "222"),
                (IdentifierKind::NationalId, "panx"),
            ]),
        ];
        let (signals, stats) = analyze(&records, &NetworkScoring::default());

        assert!(signals.iter().all(|s| s.score == 50));
        assert_eq!(
            signals[0].links,
            vec!["Linked via NATIONAL ID (panx) to 1 other entity(s)".to_string()]
        );
        assert_eq!(stats.cluster_count, 3);
        assert_eq!(stats.shared_cluster_count, 1);
    }

    #[test]
    fn stats_serialize() {
        let (_, stats) = analyze(&[], &NetworkScoring::default());
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["record_count"], 0);
        assert_eq!(json["largest_cluster"], 0);
    }
}
