//! Scoring configuration and the heuristic rule scorer.
//!
//! This crate provides:
//! - The YAML `ScoringConfig` document (weights, thresholds, units) with validation
//! - The per-record heuristic scorer with dataset-relative thresholds

pub mod error;
pub mod heuristics;
pub mod metadata;
pub mod scoring_config;
pub mod validation;

pub use error::ConfigError;
pub use heuristics::{dataset_mean, format_grouped, score_records, RuleScorer};
pub use scoring_config::{
    CurrencyUnit, FusionWeights, HeuristicRules, NetworkScoring, PortfolioPolicy, ScoringConfig,
    ScoringConfigRule,
};
