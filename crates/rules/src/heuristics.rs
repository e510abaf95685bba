//! Heuristic rule scorer.
//!
//! Three independently additive rules per record, with the above-average
//! rule judged against the mean amount of the whole batch.

use tracing::debug;
use vigil_core::{CanonicalRecord, RuleSignal};

use crate::scoring_config::HeuristicRules;

/// Mean amount over the batch, 0.0 for an empty batch.
pub fn dataset_mean(records: &[CanonicalRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.amount).sum::<f64>() / records.len() as f64
}

/// Scores amounts against a fixed dataset mean.
pub struct RuleScorer<'a> {
    rules: &'a HeuristicRules,
    mean: f64,
}

impl<'a> RuleScorer<'a> {
    pub fn new(rules: &'a HeuristicRules, mean: f64) -> Self {
        Self { rules, mean }
    }

    pub fn for_records(rules: &'a HeuristicRules, records: &[CanonicalRecord]) -> Self {
        Self::new(rules, dataset_mean(records))
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn score(&self, amount: f64) -> RuleSignal {
        let r = self.rules;
        let mut score = 0u32;
        let mut reasons = Vec::new();

        if amount > r.oversight_threshold {
            score = score.saturating_add(r.oversight_points);
            reasons.push(format!(
                "High value sanction: {} exceeds oversight threshold",
                self.money(amount)
            ));
        }

        if amount > 0.0 && amount % r.round_unit == 0.0 {
            score = score.saturating_add(r.round_points);
            reasons.push(format!(
                "Suspicious round-number amount pattern ({})",
                self.money(amount)
            ));
        }

        // Disabled when the mean is not positive.
        if self.mean > 0.0 && amount > self.mean * r.above_mean_ratio {
            let pct_over = (amount - self.mean) / self.mean * 100.0;
            let points = ((pct_over / 10.0) as u32).min(r.above_mean_cap);
            score = score.saturating_add(points);
            reasons.push(format!(
                "Amount is {:.1}% higher than dataset average ({})",
                pct_over,
                self.money(self.mean)
            ));
        }

        RuleSignal {
            score: score.min(100),
            reasons,
        }
    }

    fn money(&self, amount: f64) -> String {
        format!("{}{}", self.rules.currency_symbol, format_grouped(amount))
    }
}

/// Score every record; output is parallel to `records`.
pub fn score_records(records: &[CanonicalRecord], rules: &HeuristicRules) -> Vec<RuleSignal> {
    let scorer = RuleScorer::for_records(rules, records);
    let signals: Vec<RuleSignal> = records.iter().map(|r| scorer.score(r.amount)).collect();
    debug!(
        records = records.len(),
        mean = scorer.mean(),
        flagged = signals.iter().filter(|s| s.score > 0).count(),
        "rule scoring complete"
    );
    signals
}

/// Round to a whole number and group thousands with commas: `1500000.4` → `1,500,000`.
pub fn format_grouped(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
