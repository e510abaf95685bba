//! Scoring pipeline stages.
//!
//! - [`features`]: feature matrix for the anomaly scorers.
//! - [`anomaly`]: anomaly detector (isolation forest or z-score).
//! - [`fusion`]: combines sub-scores into the report and portfolio summary.
//! - [`metrics`]: per-stage timings.

pub mod anomaly;
pub mod features;
pub mod fusion;
pub mod metrics;
