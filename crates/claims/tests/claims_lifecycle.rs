use vigil_claims::{
    ClaimError, ClaimStatus, ClaimSubmission, ClaimsStore, PhotoEvidence, VoteAction,
};

fn submission(fund: &str, name: &str) -> ClaimSubmission {
    ClaimSubmission {
        fund_id: fund.into(),
        amount: 120_000.0,
        claimant_name: name.into(),
        description: "Village road resurfacing".into(),
        latitude: Some(21.14),
        longitude: Some(79.08),
    }
}

#[test]
fn listed_claims_serialize_and_reload() {
    let mut store = ClaimsStore::new();
    let first = store
        .submit(submission("PWD-2024-001", "Meera"), PhotoEvidence::new("f0f0e1e1"))
        .unwrap();
    store
        .submit(submission("PWD-2024-002", "Kiran"), PhotoEvidence::new("0a0b0c0d"))
        .unwrap();
    store.vote(&first.claim_id, VoteAction::Reject, "photo taken elsewhere").unwrap();

    let json = serde_json::to_value(store.list()).unwrap();
    assert_eq!(json[0]["status"], "Pending Community Verification");
    assert_eq!(json[0]["community_votes"]["rejections"], 1);
    assert_eq!(json[0]["history"][0]["action"], "reject");
    assert_eq!(json[1]["claim_id"], "CLM-1001");

    let claims = serde_json::from_value(json).unwrap();
    let mut reloaded = ClaimsStore::from_claims(claims);
    assert_eq!(reloaded.len(), 2);

    // Uniqueness survives the reload.
    let err = reloaded
        .submit(submission("PWD-2024-003", "Ravi"), PhotoEvidence::new("0a0b0c0d"))
        .unwrap_err();
    assert_eq!(err, ClaimError::DuplicatePhoto { fund_id: "PWD-2024-002".into() });

    let next = reloaded
        .submit(submission("PWD-2024-003", "Ravi"), PhotoEvidence::new("99887766"))
        .unwrap();
    assert_eq!(next.claim_id, "CLM-1002");
}

#[test]
fn community_rejects_then_stays_rejected() {
    let mut store = ClaimsStore::new();
    let id = store
        .submit(submission("HLTH-7", "Anil"), PhotoEvidence::new("abcd"))
        .unwrap()
        .claim_id;

    let actions = ["reject", "approve", "reject", "remind", "reject", "approve", "approve"];
    let mut statuses = Vec::new();
    for a in actions {
        let action: VoteAction = a.parse().unwrap();
        statuses.push(store.vote(&id, action, "").unwrap().status);
    }

    assert_eq!(statuses[3], ClaimStatus::Pending);
    assert_eq!(statuses[4], ClaimStatus::Rejected);
    assert_eq!(statuses[6], ClaimStatus::Rejected);
    assert_eq!(store.get(&id).map(|c| c.history.len()), Some(7));
}
