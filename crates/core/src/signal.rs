use serde::{Deserialize, Serialize};

/// Output of the rule scorer for one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSignal {
    /// Capped at 100.
    pub score: u32,
    /// Human-readable reasons, in rule-evaluation order.
    pub reasons: Vec<String>,
}

/// Output of the identity graph analyzer for one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSignal {
    /// Maximum cluster score across every cluster the record belongs to.
    pub score: u32,
    /// One link description per contributing cluster.
    pub links: Vec<String>,
}

/// The three independent sub-scores for one record, consumed only by fusion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalVector {
    pub rule_score: u32,
    /// Continuous anomaly score in [0, 100].
    pub anomaly_score: f64,
    pub network_score: u32,
    pub rule_reasons: Vec<String>,
    pub network_links: Vec<String>,
}

impl SignalVector {
    /// Sub-scores only, without any explanation text.
    pub fn new(rule_score: u32, anomaly_score: f64, network_score: u32) -> Self {
        Self {
            rule_score,
            anomaly_score,
            network_score,
            rule_reasons: Vec::new(),
            network_links: Vec::new(),
        }
    }

    /// Zip the per-analyzer outputs back into per-record vectors.
    ///
    /// All three slices are indexed by canonical record position and must
    /// have the same length.
    pub fn assemble(
        rules: Vec<RuleSignal>,
        anomaly_scores: &[f64],
        network: Vec<NetworkSignal>,
    ) -> Vec<SignalVector> {
        debug_assert_eq!(rules.len(), anomaly_scores.len());
        debug_assert_eq!(rules.len(), network.len());

        rules
            .into_iter()
            .zip(anomaly_scores.iter().copied())
            .zip(network)
            .map(|((rule, anomaly), net)| SignalVector {
                rule_score: rule.score,
                anomaly_score: anomaly,
                network_score: net.score,
                rule_reasons: rule.reasons,
                network_links: net.links,
            })
            .collect()
    }
}
