//! ScoringConfig document kind: heuristic thresholds, fusion weights,
//! network cluster scoring and portfolio reporting policy.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConfigError, Result};
use crate::metadata::CommonMetadata;
use crate::validation::validate_scoring_config;

pub const SCORING_CONFIG_KIND: &str = "ScoringConfig";

// ── YAML-level types ────────────────────────────────────────────────

/// Top-level ScoringConfig document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfigRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: ScoringConfig,
}

/// Every tunable constant used by the scorers and the aggregator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    #[serde(default)]
    pub heuristics: HeuristicRules,
    #[serde(default)]
    pub fusion_weights: FusionWeights,
    #[serde(default)]
    pub network: NetworkScoring,
    #[serde(default)]
    pub portfolio: PortfolioPolicy,
}

/// Thresholds for the three additive heuristic rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HeuristicRules {
    /// Amounts strictly above this need oversight.
    pub oversight_threshold: f64,
    pub oversight_points: u32,
    /// Positive exact multiples of this unit count as round amounts.
    pub round_unit: f64,
    pub round_points: u32,
    /// Amounts above `ratio * mean` score one point per 10% over the mean.
    pub above_mean_ratio: f64,
    pub above_mean_cap: u32,
    /// Prefix used when amounts are quoted in reasons.
    pub currency_symbol: String,
}

impl Default for HeuristicRules {
    fn default() -> Self {
        Self {
            oversight_threshold: 1_000_000.0,
            oversight_points: 35,
            round_unit: 1000.0,
            round_points: 15,
            above_mean_ratio: 1.5,
            above_mean_cap: 40,
            currency_symbol: "₹".to_string(),
        }
    }
}

/// Weights of the three sub-scores in the fused risk score (sum to 1.0).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FusionWeights {
    pub rule: f64,
    pub anomaly: f64,
    pub network: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            rule: 0.45,
            anomaly: 0.35,
            network: 0.20,
        }
    }
}

impl FusionWeights {
    pub fn sum(&self) -> f64 {
        self.rule + self.anomaly + self.network
    }
}

/// Identifier-sharing cluster score: `min(100, base + per_member * k)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NetworkScoring {
    pub base_score: u32,
    pub per_member: u32,
}

impl Default for NetworkScoring {
    fn default() -> Self {
        Self {
            base_score: 30,
            per_member: 10,
        }
    }
}

impl NetworkScoring {
    /// Score for every member of a cluster of `size` records.
    pub fn cluster_score(&self, size: usize) -> u32 {
        let size = u32::try_from(size).unwrap_or(u32::MAX);
        self.base_score
            .saturating_add(self.per_member.saturating_mul(size))
            .min(100)
    }
}

/// A display unit for the exposure figure, e.g. crore or lakh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CurrencyUnit {
    pub label: String,
    pub value: f64,
}

/// Portfolio reporting policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PortfolioPolicy {
    /// Records with `risk_score` strictly above this are high risk.
    pub high_risk_threshold: u32,
    /// `ml_score` strictly above this adds an anomaly reason.
    pub anomaly_reason_threshold: u32,
    pub error_rate_base: f64,
    pub error_rate_slope: f64,
    pub error_rate_ceiling: f64,
    /// Used when the exposure is at least one major unit.
    pub major_unit: CurrencyUnit,
    pub minor_unit: CurrencyUnit,
}

impl Default for PortfolioPolicy {
    fn default() -> Self {
        Self {
            high_risk_threshold: 75,
            anomaly_reason_threshold: 60,
            error_rate_base: 0.2,
            error_rate_slope: 1.3,
            error_rate_ceiling: 5.0,
            major_unit: CurrencyUnit {
                label: "Cr".to_string(),
                value: 1e7,
            },
            minor_unit: CurrencyUnit {
                label: "L".to_string(),
                value: 1e5,
            },
        }
    }
}

// ── Loading ─────────────────────────────────────────────────────────

impl ScoringConfigRule {
    /// Parse and validate a document from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let rule: ScoringConfigRule = serde_yaml::from_str(yaml)?;
        let result = validate_scoring_config(&rule);
        for w in &result.warnings {
            warn!(path = %w.path, "{}", w.message);
        }
        if !result.valid {
            let messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.path, e.message))
                .collect();
            return Err(ConfigError::Validation(messages.join("; ")));
        }
        Ok(rule)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        let rule = Self::from_yaml_str(&yaml)?;
        info!(
            id = %rule.metadata.id,
            path = %path.display(),
            "Loaded scoring config"
        );
        Ok(rule)
    }
}

impl ScoringConfig {
    /// Load the document at `path`, or the built-in defaults when `None`.
    ///
    /// A disabled document falls back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let rule = ScoringConfigRule::load(path)?;
        if !rule.metadata.enabled {
            warn!(id = %rule.metadata.id, "scoring config disabled, using built-in defaults");
            return Ok(Self::default());
        }
        Ok(rule.spec)
    }
}
