//! Anomaly detection over the feature matrix.
//!
//! Two interchangeable backends, chosen by [`AnomalyBackend`]:
//! - isolation forest (default), see [`crate::algorithms::isolation_forest`]
//! - population z-score, see [`population`]
//!
//! Both produce a raw indicator per record which is rescaled to [0, 100] by
//! the batch min/max. Small or degenerate batches get explicit fallback
//! scores instead of an error.

pub mod population;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;
use vigil_core::{AnomalyBackend, AnomalyConfig};

use crate::algorithms::isolation_forest::{upper_quantile, IsolationForest, IsolationForestParams};
use super::features::FeatureMatrix;

pub use population::{compute_population_stats, statistical_outlier_score, std_dev};

/// Confidence reported when no model output is available.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Which path produced the scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyPolicy {
    Scored,
    /// Too few records or no features: all scores 0.
    InsufficientData,
    /// Every indicator equal: all scores 0.
    DegenerateVariance,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnomalyOutcome {
    /// Continuous score per record in [0, 100].
    pub scores: Vec<f64>,
    /// `stddev(scores) / 100`, or 0.5 on a fallback path.
    pub confidence: f64,
    pub backend: AnomalyBackend,
    pub policy: AnomalyPolicy,
    /// Contamination-quantile of the raw indicator.
    pub offset: Option<f64>,
    /// Records with a raw indicator above `offset`.
    pub flagged: usize,
}

impl AnomalyOutcome {
    fn fallback(n: usize, backend: AnomalyBackend, policy: AnomalyPolicy) -> Self {
        Self {
            scores: vec![0.0; n],
            confidence: FALLBACK_CONFIDENCE,
            backend,
            policy,
            offset: None,
            flagged: 0,
        }
    }
}

pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Score every row of `features`. One self-contained fit per call.
    pub fn detect(&self, features: &FeatureMatrix, seed: u64) -> AnomalyOutcome {
        let n = features.n_rows();
        let backend = self.config.backend;

        if n < self.config.min_records || features.n_features() == 0 {
            debug!(
                records = n,
                min_records = self.config.min_records,
                "insufficient data for anomaly scoring"
            );
            return AnomalyOutcome::fallback(n, backend, AnomalyPolicy::InsufficientData);
        }

        let (indicators, offset) = match backend {
            AnomalyBackend::IsolationForest => {
                let params = IsolationForestParams {
                    n_trees: self.config.n_trees,
                    max_samples: self.config.max_samples,
                    contamination: self.config.contamination,
                    parallel: self.config.parallel,
                };
                let mut rng = StdRng::seed_from_u64(seed);
                let Some(forest) = IsolationForest::fit(&features.rows, &params, &mut rng) else {
                    return AnomalyOutcome::fallback(n, backend, AnomalyPolicy::InsufficientData);
                };
                let scores = forest.score_samples(&features.rows);
                (scores, forest.offset())
            }
            AnomalyBackend::ZScore => {
                let (means, stddevs) = compute_population_stats(&features.rows);
                let scores: Vec<f64> = features
                    .rows
                    .iter()
                    .map(|row| statistical_outlier_score(row, &means, &stddevs))
                    .collect();
                let offset = upper_quantile(&scores, self.config.contamination);
                (scores, offset)
            }
        };

        let Some(scores) = rescale(&indicators) else {
            debug!(records = n, %backend, "anomaly indicators have no variance");
            return AnomalyOutcome::fallback(n, backend, AnomalyPolicy::DegenerateVariance);
        };

        let flagged = indicators.iter().filter(|s| **s > offset).count();
        let confidence = std_dev(&scores) / 100.0;
        debug!(
            records = n,
            %backend,
            flagged,
            offset,
            confidence,
            "anomaly scoring complete"
        );

        AnomalyOutcome {
            scores,
            confidence,
            backend,
            policy: AnomalyPolicy::Scored,
            offset: Some(offset),
            flagged,
        }
    }
}

/// Min/max rescale to [0, 100]; `None` when every value is equal.
pub fn rescale(values: &[f64]) -> Option<Vec<f64>> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() || max <= min {
        return None;
    }
    let span = max - min;
    Some(values.iter().map(|v| (v - min) / span * 100.0).collect())
}
