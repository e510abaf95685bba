use serde::{Deserialize, Serialize};

/// Final per-record output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub entity: String,
    pub amount: f64,
    pub department: String,
    pub risk_score: u32,
    pub rule_score: u32,
    pub ml_score: u32,
    pub network_score: u32,
    pub network_links: Vec<String>,
    pub reasons: Vec<String>,
}

/// Portfolio-level exposure and confidence for a reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Formatted exposure, e.g. `₹1.25 Cr`.
    pub money_at_risk: String,
    pub high_risk_count: usize,
    /// Formatted percentage, e.g. `0.45%`.
    pub error_rate: String,
    /// Unformatted exposure backing `money_at_risk`.
    #[serde(skip)]
    pub exposure: f64,
    /// Unformatted percentage backing `error_rate`.
    #[serde(skip)]
    pub error_rate_pct: f64,
}

/// Everything returned for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Sorted by `risk_score` descending, ties in input order.
    pub results: Vec<RiskRecord>,
    #[serde(flatten)]
    pub summary: PortfolioSummary,
}

/// Failure payload returned at the outer boundary instead of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
