use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

/// Parse a profiled env var, warning and falling back to `default` when the
/// value does not parse.
fn profiled_env_parse<T>(profile: &str, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match profiled_env_opt(profile, key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, fallback = %default, "unparseable config value");
            default
        }),
        None => default,
    }
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key).map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub anomaly: AnomalyConfig,
    pub scoring: ScoringSourceConfig,
    pub runtime: RuntimeConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `VIGIL_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("VIGIL_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            anomaly: AnomalyConfig::from_env_profiled(p),
            scoring: ScoringSourceConfig::from_env_profiled(p),
            runtime: RuntimeConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  anomaly:  backend={}, trees={}, max_samples={}, contamination={}, parallel={}",
            self.anomaly.backend,
            self.anomaly.n_trees,
            self.anomaly.max_samples,
            self.anomaly.contamination,
            self.anomaly.parallel
        );
        tracing::info!(
            "  seed:     {}",
            self.anomaly
                .seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "(derived per request)".to_string())
        );
        tracing::info!(
            "  scoring:  {}",
            self.scoring
                .config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in defaults)".to_string())
        );
        tracing::info!(
            "  runtime:  timeout={}",
            self.runtime
                .timeout_secs
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "(none)".to_string())
        );
    }

    /// JSON view of the resolved configuration.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "anomaly": {
                "backend": self.anomaly.backend.to_string(),
                "n_trees": self.anomaly.n_trees,
                "max_samples": self.anomaly.max_samples,
                "contamination": self.anomaly.contamination,
                "min_records": self.anomaly.min_records,
                "seed": self.anomaly.seed,
                "parallel": self.anomaly.parallel,
            },
            "scoring": { "config_path": self.scoring.config_path },
            "runtime": { "timeout_secs": self.runtime.timeout_secs },
        })
    }
}

// ── Anomaly detector ──────────────────────────────────────────

/// Which anomaly scorer runs. Both are first-class paths chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyBackend {
    /// Ensemble of randomized isolation trees.
    #[default]
    IsolationForest,
    /// Population z-score outlier scoring.
    ZScore,
}

impl FromStr for AnomalyBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "isolation_forest" | "iforest" => Ok(AnomalyBackend::IsolationForest),
            "zscore" | "z_score" => Ok(AnomalyBackend::ZScore),
            other => Err(format!("unknown anomaly backend '{}'", other)),
        }
    }
}

impl std::fmt::Display for AnomalyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyBackend::IsolationForest => write!(f, "isolation_forest"),
            AnomalyBackend::ZScore => write!(f, "zscore"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyConfig {
    pub backend: AnomalyBackend,
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Upper bound on the per-tree subsample size.
    pub max_samples: usize,
    /// Fraction of the batch presumed anomalous; diagnostics only.
    pub contamination: f64,
    /// Below this many records every anomaly score is 0.
    pub min_records: usize,
    /// Fixed seed; `None` derives one from the request content.
    pub seed: Option<u64>,
    /// Build and score trees on the rayon pool.
    pub parallel: bool,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            backend: AnomalyBackend::IsolationForest,
            n_trees: 100,
            max_samples: 256,
            contamination: 0.1,
            min_records: 5,
            seed: None,
            parallel: true,
        }
    }
}

impl AnomalyConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        let backend = match profiled_env_opt(p, "ANOMALY_BACKEND") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, fallback = %d.backend, "ignoring ANOMALY_BACKEND");
                d.backend
            }),
            None => d.backend,
        };
        let contamination = profiled_env_parse(p, "ANOMALY_CONTAMINATION", d.contamination);
        let contamination = if contamination > 0.0 && contamination <= 0.5 {
            contamination
        } else {
            tracing::warn!(contamination, "ANOMALY_CONTAMINATION outside (0, 0.5]; using 0.1");
            d.contamination
        };

        Self {
            backend,
            n_trees: profiled_env_parse(p, "ANOMALY_TREES", d.n_trees).max(1),
            max_samples: profiled_env_parse(p, "ANOMALY_MAX_SAMPLES", d.max_samples).max(2),
            contamination,
            min_records: profiled_env_parse(p, "ANOMALY_MIN_RECORDS", d.min_records),
            seed: profiled_env_opt(p, "ANOMALY_SEED").and_then(|v| v.trim().parse().ok()),
            parallel: profiled_env_bool(p, "ANOMALY_PARALLEL", d.parallel),
        }
    }
}

// ── Scoring document ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringSourceConfig {
    /// YAML ScoringConfig document; `None` uses the built-in defaults.
    pub config_path: Option<PathBuf>,
}

impl ScoringSourceConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            config_path: profiled_env_opt(p, "SCORING_CONFIG_PATH").map(PathBuf::from),
        }
    }
}

// ── Runtime ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Whole-run timeout imposed by the boundary; `None` disables it.
    pub timeout_secs: Option<u64>,
}

impl RuntimeConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            timeout_secs: profiled_env_opt(p, "ANALYZE_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|s| *s > 0),
        }
    }
}
