use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClaimError;

/// Approvals (or rejections) needed beyond this count to settle a claim.
pub const VOTE_THRESHOLD: u32 = 2;

/// What the claimant sends alongside the photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSubmission {
    pub fund_id: String,
    pub amount: f64,
    pub claimant_name: String,
    pub description: String,
    /// Device-reported position; takes precedence over the photo's GPS tag.
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Photo evidence as seen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoEvidence {
    /// Perceptual hash of the image, compared for exact equality.
    pub fingerprint: String,
    /// GPS fix read from the image metadata, if any.
    #[serde(default)]
    pub gps: Option<GeoPoint>,
}

impl PhotoEvidence {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            gps: None,
        }
    }

    pub fn with_gps(mut self, latitude: f64, longitude: f64) -> Self {
        self.gps = Some(GeoPoint { latitude, longitude });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    #[serde(rename = "Pending Community Verification")]
    Pending,
    Verified,
    Rejected,
}

impl ClaimStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClaimStatus::Pending)
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimStatus::Pending => write!(f, "Pending Community Verification"),
            ClaimStatus::Verified => write!(f, "Verified"),
            ClaimStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteAction {
    Approve,
    Reject,
    /// Nudge reviewers; counted but never changes the status.
    Remind,
}

impl FromStr for VoteAction {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" => Ok(VoteAction::Approve),
            "reject" => Ok(VoteAction::Reject),
            "remind" => Ok(VoteAction::Remind),
            other => Err(ClaimError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityVotes {
    pub approvals: u32,
    pub rejections: u32,
    pub reminders: u32,
}

/// One recorded vote, kept for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteEvent {
    pub id: Uuid,
    pub action: VoteAction,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub fund_id: String,
    pub amount: f64,
    pub claimant_name: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub image_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub status: ClaimStatus,
    pub community_votes: CommunityVotes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reminder: Option<DateTime<Utc>>,
    #[serde(default)]
    pub history: Vec<VoteEvent>,
}

/// Successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitReceipt {
    pub claim_id: String,
    pub message: String,
    pub warnings: Vec<String>,
}

/// Result of a vote that reached a known claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteOutcome {
    pub message: String,
    pub status: ClaimStatus,
}
