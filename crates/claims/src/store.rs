use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ClaimError;
use crate::types::*;

/// In-memory claims registry. Owned by the caller and passed where needed.
#[derive(Debug, Default)]
pub struct ClaimsStore {
    /// Submission order.
    claims: Vec<Claim>,
    by_id: HashMap<String, usize>,
    by_fund: HashMap<String, usize>,
    by_fingerprint: HashMap<String, usize>,
}

impl ClaimsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously listed claims, in the given order.
    pub fn from_claims(claims: Vec<Claim>) -> Self {
        let mut store = Self::new();
        for claim in claims {
            store.insert(claim);
        }
        store
    }

    fn insert(&mut self, claim: Claim) {
        let idx = self.claims.len();
        self.by_id.insert(claim.claim_id.clone(), idx);
        self.by_fund.entry(claim.fund_id.clone()).or_insert(idx);
        self.by_fingerprint.entry(claim.image_hash.clone()).or_insert(idx);
        self.claims.push(claim);
    }

    /// Register a claim. Rejects a fund id or a photo fingerprint that an
    /// earlier claim already used.
    pub fn submit(
        &mut self,
        submission: ClaimSubmission,
        photo: PhotoEvidence,
    ) -> Result<SubmitReceipt, ClaimError> {
        if let Some(&idx) = self.by_fund.get(&submission.fund_id) {
            let existing = &self.claims[idx];
            warn!(fund_id = %submission.fund_id, existing = %existing.claim_id, "duplicate fund claim");
            return Err(ClaimError::DuplicateClaim {
                fund_id: submission.fund_id,
                claimant_name: existing.claimant_name.clone(),
                submitted_at: existing.timestamp,
            });
        }
        if let Some(&idx) = self.by_fingerprint.get(&photo.fingerprint) {
            let existing = &self.claims[idx];
            warn!(fund_id = %submission.fund_id, existing = %existing.claim_id, "duplicate claim photo");
            return Err(ClaimError::DuplicatePhoto {
                fund_id: existing.fund_id.clone(),
            });
        }

        let location = match (submission.latitude, submission.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint { latitude, longitude }),
            _ => photo.gps,
        };
        let warnings = if location.is_none() {
            vec!["No GPS data found in photo.".to_string()]
        } else {
            Vec::new()
        };

        let claim_id = format!("CLM-{}", 1000 + self.claims.len());
        let claim = Claim {
            claim_id: claim_id.clone(),
            fund_id: submission.fund_id,
            amount: submission.amount,
            claimant_name: submission.claimant_name,
            description: submission.description,
            timestamp: Utc::now(),
            image_hash: photo.fingerprint,
            location,
            status: ClaimStatus::Pending,
            community_votes: CommunityVotes::default(),
            last_reminder: None,
            history: Vec::new(),
        };
        info!(claim_id = %claim_id, fund_id = %claim.fund_id, "claim submitted");
        self.insert(claim);

        Ok(SubmitReceipt {
            claim_id,
            message: "Claim submitted successfully".to_string(),
            warnings,
        })
    }

    /// All claims in submission order.
    pub fn list(&self) -> &[Claim] {
        &self.claims
    }

    pub fn get(&self, claim_id: &str) -> Option<&Claim> {
        self.by_id.get(claim_id).map(|&i| &self.claims[i])
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Record a community vote. Votes on a settled claim are still counted
    /// but the status no longer changes.
    pub fn vote(
        &mut self,
        claim_id: &str,
        action: VoteAction,
        notes: &str,
    ) -> Result<VoteOutcome, ClaimError> {
        let idx = *self
            .by_id
            .get(claim_id)
            .ok_or_else(|| ClaimError::NotFound(claim_id.to_string()))?;
        let claim = &mut self.claims[idx];
        let now = Utc::now();

        match action {
            VoteAction::Approve => claim.community_votes.approvals += 1,
            VoteAction::Reject => claim.community_votes.rejections += 1,
            VoteAction::Remind => {
                claim.community_votes.reminders += 1;
                claim.last_reminder = Some(now);
            }
        }
        claim.history.push(VoteEvent {
            id: Uuid::new_v4(),
            action,
            notes: notes.trim().to_string(),
            timestamp: now,
        });

        if !claim.status.is_terminal() {
            let votes = claim.community_votes;
            if votes.approvals > VOTE_THRESHOLD {
                claim.status = ClaimStatus::Verified;
            } else if votes.rejections > VOTE_THRESHOLD {
                claim.status = ClaimStatus::Rejected;
            }
            if claim.status.is_terminal() {
                info!(claim_id, status = %claim.status, "claim settled");
            }
        }
        debug!(claim_id, ?action, "vote recorded");

        Ok(VoteOutcome {
            message: "Vote recorded".to_string(),
            status: claim.status,
        })
    }
}
