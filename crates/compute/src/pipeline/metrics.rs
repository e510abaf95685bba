use std::time::Duration;

use serde::Serialize;

/// Stages of one analysis run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Canonicalize,
    Rules,
    Anomaly,
    Graph,
    Fusion,
}

/// Per-run timing metrics, filled in by the engine as each stage completes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineMetrics {
    pub canonicalize_ms: f64,
    pub rules_ms: f64,
    pub anomaly_ms: f64,
    pub graph_ms: f64,
    pub fusion_ms: f64,
    /// Wall time of the whole run.
    pub total_ms: f64,
    /// Canonical records scored per second of total wall time.
    pub records_per_second: f64,

    #[serde(skip)]
    stages_recorded: usize,
}

impl PipelineMetrics {
    pub fn record_stage(&mut self, stage: Stage, elapsed: Duration) {
        let ms = elapsed.as_secs_f64() * 1000.0;
        match stage {
            Stage::Canonicalize => self.canonicalize_ms = ms,
            Stage::Rules => self.rules_ms = ms,
            Stage::Anomaly => self.anomaly_ms = ms,
            Stage::Graph => self.graph_ms = ms,
            Stage::Fusion => self.fusion_ms = ms,
        }
        self.stages_recorded += 1;
    }

    pub fn finish(&mut self, records: usize, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        self.total_ms = secs * 1000.0;
        if secs > 0.0 {
            self.records_per_second = records as f64 / secs;
        }
    }

    pub fn stages_recorded(&self) -> usize {
        self.stages_recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_stage_durations() {
        let mut m = PipelineMetrics::default();
        m.record_stage(Stage::Rules, Duration::from_millis(3));
        m.record_stage(Stage::Anomaly, Duration::from_micros(1500));
        m.finish(100, Duration::from_millis(500));

        assert!((m.rules_ms - 3.0).abs() < 1e-9);
        assert!((m.anomaly_ms - 1.5).abs() < 1e-9);
        assert!((m.records_per_second - 200.0).abs() < 1e-9);
        assert_eq!(m.stages_recorded(), 2);
    }

    #[test]
    fn zero_elapsed_leaves_throughput_unset() {
        let mut m = PipelineMetrics::default();
        m.finish(10, Duration::ZERO);
        assert_eq!(m.records_per_second, 0.0);
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("stages_recorded").is_none());
    }
}
