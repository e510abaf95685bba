use std::time::Instant;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;
use vigil_core::{
    AnomalyBackend, AnomalyConfig, CanonicalRecord, Config, RawRecord, RiskReport, SignalVector,
    VigilError,
};
use vigil_graph::GraphStats;
use vigil_ingest::{canonicalize_with_stats, CanonicalizeStats};
use vigil_rules::{score_records, ScoringConfig};

use crate::pipeline::anomaly::{AnomalyDetector, AnomalyPolicy};
use crate::pipeline::features::FeatureMatrix;
use crate::pipeline::fusion;
use crate::pipeline::metrics::{PipelineMetrics, Stage};

/// Everything a run learned besides the report itself.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub seed: u64,
    pub backend: AnomalyBackend,
    pub feature_columns: Vec<String>,
    pub canonicalize: CanonicalizeStats,
    pub anomaly_policy: AnomalyPolicy,
    pub anomaly_offset: Option<f64>,
    /// Records beyond the contamination offset.
    pub anomaly_flagged: usize,
    pub confidence: f64,
    pub graph: GraphStats,
    pub metrics: PipelineMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub report: RiskReport,
    pub diagnostics: Diagnostics,
}

/// Stateless scoring engine. Every call to [`RiskEngine::analyze`] is an
/// independent batch; nothing is kept between requests.
pub struct RiskEngine {
    anomaly: AnomalyConfig,
    scoring: ScoringConfig,
}

impl RiskEngine {
    pub fn new(anomaly: AnomalyConfig, scoring: ScoringConfig) -> Self {
        Self { anomaly, scoring }
    }

    /// Build from the resolved environment config, loading the scoring
    /// document when one is configured.
    pub fn from_config(config: &Config) -> Result<Self, VigilError> {
        let scoring = ScoringConfig::load_or_default(config.scoring.config_path.as_deref())?;
        Ok(Self::new(config.anomaly.clone(), scoring))
    }

    pub fn analyze(&self, raw: &[RawRecord]) -> Result<RiskReport, VigilError> {
        Ok(self.analyze_with_diagnostics(raw)?.report)
    }

    /// Run the whole pipeline: canonicalize, the three analyzers, fusion.
    pub fn analyze_with_diagnostics(&self, raw: &[RawRecord]) -> Result<Analysis, VigilError> {
        if raw.is_empty() {
            return Err(VigilError::EmptyDataset);
        }

        let start = Instant::now();
        let mut metrics = PipelineMetrics::default();

        let stage = Instant::now();
        let (records, canonical_stats) = canonicalize_with_stats(raw);
        metrics.record_stage(Stage::Canonicalize, stage.elapsed());
        if records.is_empty() {
            return Err(VigilError::EmptyDataset);
        }
        info!(
            rows = raw.len(),
            records = records.len(),
            duplicates = canonical_stats.duplicates_dropped,
            "Canonicalized in {:.1}ms",
            metrics.canonicalize_ms
        );

        let seed = match self.anomaly.seed {
            Some(seed) => seed,
            None => derive_seed(&records)?,
        };

        let stage = Instant::now();
        let rule_signals = score_records(&records, &self.scoring.heuristics);
        metrics.record_stage(Stage::Rules, stage.elapsed());

        let stage = Instant::now();
        let features = FeatureMatrix::from_records(&records);
        let detector = AnomalyDetector::new(self.anomaly.clone());
        let anomaly = detector.detect(&features, seed);
        metrics.record_stage(Stage::Anomaly, stage.elapsed());
        info!(
            backend = %anomaly.backend,
            flagged = anomaly.flagged,
            "Anomaly scoring done in {:.1}ms",
            metrics.anomaly_ms
        );

        let stage = Instant::now();
        let (network_signals, graph_stats) = vigil_graph::analyze(&records, &self.scoring.network);
        metrics.record_stage(Stage::Graph, stage.elapsed());

        let stage = Instant::now();
        let signals = SignalVector::assemble(rule_signals, &anomaly.scores, network_signals);
        let report = fusion::fuse(&records, signals, anomaly.confidence, &self.scoring);
        metrics.record_stage(Stage::Fusion, stage.elapsed());

        metrics.finish(records.len(), start.elapsed());
        info!(
            records = records.len(),
            high_risk = report.summary.high_risk_count,
            "Analysis complete in {:.1}ms",
            metrics.total_ms
        );

        let diagnostics = Diagnostics {
            seed,
            backend: anomaly.backend,
            feature_columns: features.columns,
            canonicalize: canonical_stats,
            anomaly_policy: anomaly.policy,
            anomaly_offset: anomaly.offset,
            anomaly_flagged: anomaly.flagged,
            confidence: anomaly.confidence,
            graph: graph_stats,
            metrics,
        };
        Ok(Analysis { report, diagnostics })
    }
}

/// Seed from the content of the canonical batch: the first eight bytes of
/// the SHA-256 of its JSON encoding. Identical batches get identical seeds.
pub fn derive_seed(records: &[CanonicalRecord]) -> Result<u64, VigilError> {
    let bytes = serde_json::to_vec(records)
        .map_err(|e| VigilError::Internal(format!("seed derivation failed: {}", e)))?;
    let digest = Sha256::digest(&bytes);
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    Ok(u64::from_le_bytes(head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::FieldValue;

    fn row(entity: &str, amount: f64) -> RawRecord {
        RawRecord::from_pairs([
            ("entity", FieldValue::Text(entity.into())),
            ("amount", FieldValue::Float(amount)),
        ])
    }

    fn engine(seed: Option<u64>) -> RiskEngine {
        let anomaly = AnomalyConfig {
            n_trees: 25,
            seed,
            parallel: false,
            ..AnomalyConfig::default()
        };
        RiskEngine::new(anomaly, ScoringConfig::default())
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = engine(None).analyze(&[]).unwrap_err();
        assert!(matches!(err, VigilError::EmptyDataset));
    }

    #[test]
    fn derived_seed_depends_on_content() {
        let a: Vec<RawRecord> = (0..6).map(|i| row(&format!("v{}", i), 10.0 * i as f64)).collect();
        let mut b = a.clone();
        b.push(row("extra", 1.0));

        let e = engine(None);
        let da = e.analyze_with_diagnostics(&a).unwrap().diagnostics;
        let da2 = e.analyze_with_diagnostics(&a).unwrap().diagnostics;
        let db = e.analyze_with_diagnostics(&b).unwrap().diagnostics;
        assert_eq!(da.seed, da2.seed);
        assert_ne!(da.seed, db.seed);
    }

    #[test]
    fn configured_seed_is_used() {
        let rows: Vec<RawRecord> = (0..3).map(|i| row("v", i as f64)).collect();
        let d = engine(Some(42)).analyze_with_diagnostics(&rows).unwrap().diagnostics;
        assert_eq!(d.seed, 42);
        assert_eq!(d.anomaly_policy, AnomalyPolicy::InsufficientData);
        assert_eq!(d.feature_columns, vec!["amount", "department"]);
        assert_eq!(d.metrics.stages_recorded(), 5);
    }

    #[test]
    fn report_keeps_every_canonical_record() {
        let rows: Vec<RawRecord> = (0..12).map(|i| row(&format!("v{}", i), 100.0 + i as f64)).collect();
        let analysis = engine(Some(5)).analyze_with_diagnostics(&rows).unwrap();
        assert_eq!(analysis.report.results.len(), 12);
        assert_eq!(analysis.diagnostics.canonicalize.input_rows, 12);
        assert!(analysis
            .report
            .results
            .windows(2)
            .all(|w| w[0].risk_score >= w[1].risk_score));
    }
}
