//! Structural validation for scoring documents.
//!
//! Returns a [`ValidationResult`] with errors (reject the document) and
//! warnings (advisory, logged on load).

use serde::{Deserialize, Serialize};

use crate::scoring_config::{ScoringConfigRule, SCORING_CONFIG_KIND};

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dotted location, e.g. `"spec.fusion_weights"`.
    pub path: String,
    pub message: String,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }
}

fn is_kebab_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

// ── ScoringConfig validation ────────────────────────────────────────

pub fn validate_scoring_config(rule: &ScoringConfigRule) -> ValidationResult {
    let mut result = ValidationResult::new();

    if rule.api_version != "v1" {
        result.error(
            "apiVersion",
            format!("apiVersion must be 'v1', got '{}'", rule.api_version),
        );
    }
    if rule.kind != SCORING_CONFIG_KIND {
        result.error(
            "kind",
            format!("kind must be '{}', got '{}'", SCORING_CONFIG_KIND, rule.kind),
        );
    }
    if !is_kebab_case(&rule.metadata.id) {
        result.error(
            "metadata.id",
            format!(
                "id must be kebab-case (lowercase alphanumeric + hyphens), got '{}'",
                rule.metadata.id
            ),
        );
    }

    let spec = &rule.spec;

    let w = &spec.fusion_weights;
    if [w.rule, w.anomaly, w.network].iter().any(|x| *x < 0.0) {
        result.error("spec.fusion_weights", "weights must be non-negative");
    }
    if (w.sum() - 1.0).abs() > 0.01 {
        result.error(
            "spec.fusion_weights",
            format!("weights sum to {:.3} (expected 1.0)", w.sum()),
        );
    }

    let h = &spec.heuristics;
    if h.oversight_threshold <= 0.0 {
        result.error(
            "spec.heuristics.oversight_threshold",
            "oversight_threshold must be positive",
        );
    }
    if h.round_unit <= 0.0 {
        result.error("spec.heuristics.round_unit", "round_unit must be positive");
    }
    if h.above_mean_ratio < 1.0 {
        result.warn(
            "spec.heuristics.above_mean_ratio",
            format!(
                "above_mean_ratio {} flags amounts below the dataset mean",
                h.above_mean_ratio
            ),
        );
    }

    let p = &spec.portfolio;
    if p.high_risk_threshold > 100 {
        result.error(
            "spec.portfolio.high_risk_threshold",
            format!("threshold must be in [0, 100], got {}", p.high_risk_threshold),
        );
    }
    if p.anomaly_reason_threshold > 100 {
        result.error(
            "spec.portfolio.anomaly_reason_threshold",
            format!(
                "threshold must be in [0, 100], got {}",
                p.anomaly_reason_threshold
            ),
        );
    }
    if p.error_rate_ceiling < p.error_rate_base {
        result.error(
            "spec.portfolio.error_rate_ceiling",
            format!(
                "ceiling ({}) must not be below base ({})",
                p.error_rate_ceiling, p.error_rate_base
            ),
        );
    }
    if !(p.minor_unit.value > 0.0 && p.minor_unit.value < p.major_unit.value) {
        result.error(
            "spec.portfolio",
            format!(
                "units must satisfy 0 < minor ({}) < major ({})",
                p.minor_unit.value, p.major_unit.value
            ),
        );
    }

    result
}
