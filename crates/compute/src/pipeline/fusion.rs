//! Fusion of the three sub-scores into the final report.

use vigil_core::{CanonicalRecord, PortfolioSummary, RiskRecord, RiskReport, SignalVector};
use vigil_rules::{FusionWeights, PortfolioPolicy, ScoringConfig};

/// Weighted sum of the integer sub-scores, rounded and clamped to [0, 100].
pub fn risk_score(rule: u32, ml: u32, network: u32, weights: &FusionWeights) -> u32 {
    let raw = weights.rule * f64::from(rule)
        + weights.anomaly * f64::from(ml)
        + weights.network * f64::from(network);
    raw.round().clamp(0.0, 100.0) as u32
}

/// Truncate a continuous anomaly score to the reported integer.
pub fn ml_score(anomaly: f64) -> u32 {
    if anomaly.is_finite() {
        anomaly.clamp(0.0, 100.0) as u32
    } else {
        0
    }
}

/// Capitalize the first letter of every word and lower-case the rest.
/// A word starts after any non-alphabetic character.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// `₹1.25 Cr` at or above one major unit, else `₹3.40 L`.
pub fn format_exposure(amount: f64, symbol: &str, policy: &PortfolioPolicy) -> String {
    let unit = if amount >= policy.major_unit.value {
        &policy.major_unit
    } else {
        &policy.minor_unit
    };
    format!("{}{:.2} {}", symbol, amount / unit.value, unit.label)
}

pub fn error_rate(confidence: f64, policy: &PortfolioPolicy) -> f64 {
    (policy.error_rate_base + confidence * policy.error_rate_slope).min(policy.error_rate_ceiling)
}

/// Build the sorted report. `records` and `signals` are parallel.
pub fn fuse(
    records: &[CanonicalRecord],
    signals: Vec<SignalVector>,
    confidence: f64,
    config: &ScoringConfig,
) -> RiskReport {
    let policy = &config.portfolio;

    let mut results: Vec<RiskRecord> = records
        .iter()
        .zip(signals)
        .map(|(record, signal)| {
            let ml = ml_score(signal.anomaly_score);
            let risk = risk_score(
                signal.rule_score,
                ml,
                signal.network_score,
                &config.fusion_weights,
            );

            let mut reasons = signal.rule_reasons;
            if ml > policy.anomaly_reason_threshold {
                reasons.push(format!(
                    "ML Anomaly: Behavior outlier (Confidence {}%)",
                    ml
                ));
            }
            if signal.network_score > 0 {
                reasons.push(format!(
                    "Network: Identity sharing found ({} links)",
                    signal.network_links.len()
                ));
            }

            RiskRecord {
                entity: record.entity.clone(),
                amount: record.amount,
                department: title_case(&record.department),
                risk_score: risk,
                rule_score: signal.rule_score,
                ml_score: ml,
                network_score: signal.network_score,
                network_links: signal.network_links,
                reasons,
            }
        })
        .collect();

    let high_risk: Vec<&RiskRecord> = results
        .iter()
        .filter(|r| r.risk_score > policy.high_risk_threshold)
        .collect();
    let exposure: f64 = high_risk.iter().map(|r| r.amount).sum();
    let high_risk_count = high_risk.len();
    let error_rate_pct = error_rate(confidence, policy);

    let summary = PortfolioSummary {
        money_at_risk: format_exposure(exposure, &config.heuristics.currency_symbol, policy),
        high_risk_count,
        error_rate: format!("{:.2}%", error_rate_pct),
        exposure,
        error_rate_pct,
    };

    // Stable: ties keep input order.
    results.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));

    RiskReport { results, summary }
}
