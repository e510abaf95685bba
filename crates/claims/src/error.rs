use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClaimError {
    #[error("Duplicate Claim Detected: Fund ID {fund_id} has already been claimed by {claimant_name} on {submitted_at}.")]
    DuplicateClaim {
        fund_id: String,
        claimant_name: String,
        submitted_at: DateTime<Utc>,
    },

    #[error("Duplicate Photo Detected: This photo was already used in claim for Fund ID {fund_id}.")]
    DuplicatePhoto { fund_id: String },

    #[error("Claim not found: {0}")]
    NotFound(String),

    #[error("Unknown vote action: {0}")]
    UnknownAction(String),
}

impl ClaimError {
    /// Short title for the failure, without the details.
    pub fn title(&self) -> &'static str {
        match self {
            ClaimError::DuplicateClaim { .. } => "Duplicate Claim Detected",
            ClaimError::DuplicatePhoto { .. } => "Duplicate Photo Detected",
            ClaimError::NotFound(_) => "Claim not found",
            ClaimError::UnknownAction(_) => "Unknown vote action",
        }
    }
}
