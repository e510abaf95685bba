//! Integration tests that verify every shipped scoring document in
//! `data/scoring/` loads and validates.

use vigil_rules::validation::validate_scoring_config;
use vigil_rules::{ScoringConfig, ScoringConfigRule};

/// Integration tests run from the crate directory, so go up two levels.
fn scoring_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/scoring")
}

fn load_doc(relative: &str) -> ScoringConfigRule {
    let path = scoring_dir().join(relative);
    ScoringConfigRule::load(&path)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

#[test]
fn every_shipped_document_validates() {
    let mut paths = vec![scoring_dir().join("scoring-config.yml")];
    for entry in std::fs::read_dir(scoring_dir().join("examples")).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().map_or(false, |e| e == "yml") {
            paths.push(path);
        }
    }
    assert!(paths.len() >= 3);

    for path in paths {
        let rule = ScoringConfigRule::load(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));
        let result = validate_scoring_config(&rule);
        assert!(result.valid, "{}: {:?}", path.display(), result.errors);
    }
}

// ── network-heavy.yml ───────────────────────────────────────

#[test]
fn network_heavy_overrides_only_listed_sections() {
    let rule = load_doc("examples/network-heavy.yml");
    assert_eq!(rule.metadata.id, "network-heavy-scoring");
    assert!(rule.metadata.enabled);

    let spec = &rule.spec;
    assert_eq!(spec.fusion_weights.network, 0.40);
    assert!((spec.fusion_weights.sum() - 1.0).abs() < 1e-9);
    assert_eq!(spec.network.cluster_score(2), 70);
    assert_eq!(spec.network.cluster_score(5), 100);

    let defaults = ScoringConfig::default();
    assert_eq!(spec.heuristics, defaults.heuristics);
    assert_eq!(spec.portfolio, defaults.portfolio);
}

// ── usd-ledger.yml ──────────────────────────────────────────

#[test]
fn disabled_document_falls_back_to_defaults() {
    let rule = load_doc("examples/usd-ledger.yml");
    assert!(!rule.metadata.enabled);
    assert_eq!(rule.spec.heuristics.currency_symbol, "$");
    assert_eq!(rule.spec.portfolio.major_unit.label, "M");

    let path = scoring_dir().join("examples/usd-ledger.yml");
    let effective = ScoringConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(effective, ScoringConfig::default());
}
