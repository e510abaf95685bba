pub mod algorithms;
pub mod engine;
pub mod pipeline;

pub use engine::{derive_seed, Analysis, Diagnostics, RiskEngine};
pub use pipeline::anomaly::{AnomalyDetector, AnomalyOutcome, AnomalyPolicy};
pub use pipeline::features::FeatureMatrix;
pub use pipeline::metrics::PipelineMetrics;
