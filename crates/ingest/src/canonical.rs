use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};
use vigil_core::{CanonicalRecord, FieldValue, IdentifierKind, RawRecord, MISSING_FILL};

pub const DEFAULT_DEPARTMENT: &str = "General Audit";

const ENTITY: &str = "entity";
const DEPARTMENT: &str = "department";
const AMOUNT: &str = "amount";

const ENTITY_SYNONYMS: &[&str] = &["name", "vendor", "beneficiary name"];
const DEPARTMENT_SYNONYMS: &[&str] = &["scheme", "program"];
const AMOUNT_SYNONYMS: &[&str] = &["value"];

const CURRENCY_SYMBOLS: &[char] = &['₹', '$', '€', '£'];

/// Counters for the recoveries made while canonicalizing one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalizeStats {
    pub input_rows: usize,
    pub duplicates_dropped: usize,
    /// Amount cells present but not numeric.
    pub amount_coercions: usize,
    /// Rows with no usable amount cell.
    pub missing_amount: usize,
    pub entity_defaults: usize,
    pub department_defaults: usize,
}

pub fn canonicalize(raw: &[RawRecord]) -> Vec<CanonicalRecord> {
    canonicalize_with_stats(raw).0
}

/// Map raw rows onto the canonical schema.
///
/// Output keeps input order minus exact duplicates (first occurrence wins).
/// Never fails: unusable cells are coerced or defaulted and counted.
pub fn canonicalize_with_stats(raw: &[RawRecord]) -> (Vec<CanonicalRecord>, CanonicalizeStats) {
    let mut stats = CanonicalizeStats {
        input_rows: raw.len(),
        ..Default::default()
    };
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(raw.len());

    for row in raw {
        let partial = normalize_row(row, &mut stats);
        let position = records.len() + 1;
        let entity = partial
            .entity
            .clone()
            .unwrap_or_else(|| format!("Record {}", position));
        let department = partial
            .department
            .clone()
            .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string());

        // A row is a duplicate if it matches an earlier row either as read or
        // with its defaults filled in.
        let raw_key = partial.dedup_key(partial.entity.as_deref(), partial.department.as_deref());
        let resolved_key = partial.dedup_key(Some(entity.as_str()), Some(department.as_str()));
        if seen.contains(&raw_key) || seen.contains(&resolved_key) {
            stats.duplicates_dropped += 1;
            continue;
        }
        seen.insert(raw_key);
        seen.insert(resolved_key);

        if partial.entity.is_none() {
            stats.entity_defaults += 1;
        }
        if partial.department.is_none() {
            stats.department_defaults += 1;
        }

        records.push(CanonicalRecord {
            entity,
            department,
            amount: partial.amount,
            identifiers: partial.identifiers,
            extra: partial.extra,
        });
    }

    if stats.amount_coercions > 0 || stats.missing_amount > 0 {
        warn!(
            coerced = stats.amount_coercions,
            missing = stats.missing_amount,
            "non-numeric or missing amounts treated as 0.0"
        );
    }
    debug!(
        input = stats.input_rows,
        output = records.len(),
        duplicates = stats.duplicates_dropped,
        entity_defaults = stats.entity_defaults,
        department_defaults = stats.department_defaults,
        "canonicalized batch"
    );

    (records, stats)
}

// ── Row normalization ─────────────────────────────────────────

/// A normalized row before default synthesis; this is also the dedup key.
struct PartialRecord {
    entity: Option<String>,
    department: Option<String>,
    amount: f64,
    identifiers: BTreeMap<IdentifierKind, Vec<String>>,
    extra: IndexMap<String, FieldValue>,
}

impl PartialRecord {
    fn dedup_key(&self, entity: Option<&str>, department: Option<&str>) -> String {
        let mut parts = vec![
            format!("e:{}", entity.unwrap_or("\u{0}")),
            format!("d:{}", department.unwrap_or("\u{0}")),
            format!("a:{}", self.amount.to_bits()),
        ];
        for (kind, values) in &self.identifiers {
            parts.push(format!("{}={}", kind.column_name(), values.join("\u{1e}")));
        }
        for (column, value) in &self.extra {
            parts.push(format!("{}={}", column, value.dedup_token()));
        }
        parts.join("\u{1f}")
    }
}

fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase()
}

fn normalize_row(row: &RawRecord, stats: &mut CanonicalizeStats) -> PartialRecord {
    // First column wins when two names normalize to the same key.
    let mut columns: IndexMap<String, &FieldValue> = IndexMap::with_capacity(row.len());
    for (name, value) in &row.fields {
        columns.entry(normalize_column(name)).or_insert(value);
    }

    let mut consumed: HashSet<&'static str> = [ENTITY, DEPARTMENT, AMOUNT].into_iter().collect();

    let entity = pick_text(&columns, ENTITY, ENTITY_SYNONYMS, &mut consumed);
    let department = pick_text(&columns, DEPARTMENT, DEPARTMENT_SYNONYMS, &mut consumed);
    let amount = match pick_value(&columns, AMOUNT, AMOUNT_SYNONYMS, &mut consumed) {
        Some(value) => coerce_amount(value).unwrap_or_else(|| {
            stats.amount_coercions += 1;
            0.0
        }),
        None => {
            stats.missing_amount += 1;
            0.0
        }
    };

    let mut identifiers = BTreeMap::new();
    for kind in IdentifierKind::ALL {
        consumed.extend(kind.column_synonyms().iter().copied());
        let mut values: Vec<String> = Vec::new();
        for value in kind
            .column_synonyms()
            .iter()
            .filter_map(|c| columns.get(*c))
            .filter_map(|v| v.render())
        {
            let value = value.to_lowercase();
            if !values.contains(&value) {
                values.push(value);
            }
        }
        if !values.is_empty() {
            identifiers.insert(kind, values);
        }
    }

    let extra = columns
        .iter()
        .filter(|(name, _)| !consumed.contains(name.as_str()))
        .map(|(name, value)| (name.clone(), fill_extra(value)))
        .collect();

    PartialRecord {
        entity,
        department,
        amount,
        identifiers,
        extra,
    }
}

/// Find the canonical column's value, else the first synonym with a value.
/// A synonym is only consumed when it supplied the value.
fn pick_value<'a>(
    columns: &IndexMap<String, &'a FieldValue>,
    canonical: &str,
    synonyms: &[&'static str],
    consumed: &mut HashSet<&'static str>,
) -> Option<&'a FieldValue> {
    if let Some(v) = columns.get(canonical).copied().filter(|v| !v.is_missing()) {
        return Some(v);
    }
    for &synonym in synonyms {
        if let Some(v) = columns.get(synonym).copied().filter(|v| !v.is_missing()) {
            consumed.insert(synonym);
            return Some(v);
        }
    }
    None
}

fn pick_text(
    columns: &IndexMap<String, &FieldValue>,
    canonical: &str,
    synonyms: &[&'static str],
    consumed: &mut HashSet<&'static str>,
) -> Option<String> {
    pick_value(columns, canonical, synonyms, consumed).and_then(FieldValue::render)
}

fn fill_extra(value: &FieldValue) -> FieldValue {
    match value {
        v if v.is_missing() => FieldValue::Text(MISSING_FILL.to_string()),
        FieldValue::Text(s) => FieldValue::Text(s.trim().to_string()),
        other => other.clone(),
    }
}

/// Numeric value of an amount cell, or None when it cannot be read as one.
pub fn coerce_amount(value: &FieldValue) -> Option<f64> {
    let n = match value {
        FieldValue::Integer(i) => *i as f64,
        FieldValue::Float(f) => *f,
        FieldValue::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        FieldValue::Text(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches(CURRENCY_SYMBOLS)
                .chars()
                .filter(|c| *c != ',' && *c != '_')
                .collect();
            cleaned.trim().parse::<f64>().ok()?
        }
        FieldValue::Null => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn row(pairs: &[(&str, FieldValue)]) -> RawRecord {
        RawRecord::from_pairs(pairs.iter().cloned())
    }

    #[test]
    fn maps_synonyms_case_insensitively() {
        let raw = vec![row(&[
            ("  Beneficiary Name ", text("Acme Traders")),
            ("SCHEME", text("housing")),
            ("Value", FieldValue::Integer(5000)),
        ])];
        let out = canonicalize(&raw);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].entity, "Acme Traders");
        assert_eq!(out[0].department, "housing");
        assert_eq!(out[0].amount, 5000.0);
        assert!(out[0].extra.is_empty());
    }

    #[test]
    fn canonical_column_beats_synonym() {
        let raw = vec![row(&[
            ("name", text("From Name")),
            ("Entity", text("From Entity")),
        ])];
        let out = canonicalize(&raw);
        assert_eq!(out[0].entity, "From Entity");
        // The unused synonym is passed through.
        assert_eq!(out[0].extra_text("name").as_deref(), Some("From Name"));
    }

    #[test]
    fn synonym_fills_blank_canonical_cell() {
        let raw = vec![row(&[("entity", text("  ")), ("vendor", text("V1"))])];
        assert_eq!(canonicalize(&raw)[0].entity, "V1");
    }

    #[test]
    fn defaults_for_missing_fields() {
        let raw = vec![
            row(&[("amount", FieldValue::Integer(1))]),
            row(&[("amount", FieldValue::Integer(2)), ("department", FieldValue::Null)]),
        ];
        let (out, stats) = canonicalize_with_stats(&raw);

        assert_eq!(out[0].entity, "Record 1");
        assert_eq!(out[1].entity, "Record 2");
        assert_eq!(out[1].department, DEFAULT_DEPARTMENT);
        assert_eq!(stats.entity_defaults, 2);
        assert_eq!(stats.department_defaults, 2);
    }

    #[test]
    fn amount_coercion_never_fails() {
        assert_eq!(coerce_amount(&text("₹1,50,000")), Some(150000.0));
        assert_eq!(coerce_amount(&text(" $2_500.5 ")), Some(2500.5));
        assert_eq!(coerce_amount(&FieldValue::Boolean(true)), Some(1.0));
        assert_eq!(coerce_amount(&text("abc")), None);
        assert_eq!(coerce_amount(&FieldValue::Float(f64::INFINITY)), None);

        let raw = vec![
            row(&[("entity", text("a")), ("amount", text("n/a-ish"))]),
            row(&[("entity", text("b"))]),
        ];
        let (out, stats) = canonicalize_with_stats(&raw);
        assert_eq!(out[0].amount, 0.0);
        assert_eq!(out[1].amount, 0.0);
        assert_eq!(stats.amount_coercions, 1);
        assert_eq!(stats.missing_amount, 1);
    }

    #[test]
    fn identifiers_are_normalized() {
        let raw = vec![row(&[
            ("Phone Number", FieldValue::Integer(9999999999)),
            ("PAN", text(" ABCDE1234F ")),
            ("Address", text("12 MG Road")),
        ])];
        let out = canonicalize(&raw);
        let r = &out[0];

        assert_eq!(r.identifier(IdentifierKind::Phone), Some("9999999999"));
        assert_eq!(r.identifier(IdentifierKind::NationalId), Some("abcde1234f"));
        assert_eq!(r.identifier(IdentifierKind::Address), Some("12 mg road"));
        assert!(r.extra.is_empty());
    }

    #[test]
    fn duplicates_collapse_first_wins() {
        let raw = vec![
            row(&[("Name", text("A")), ("Amount", FieldValue::Integer(10))]),
            row(&[("name", text(" A ")), ("amount", FieldValue::Integer(10))]),
            row(&[("Name", text("B")), ("Amount", FieldValue::Integer(10))]),
        ];
        let (out, stats) = canonicalize_with_stats(&raw);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].entity, "A");
        assert_eq!(out[1].entity, "B");
        assert_eq!(stats.duplicates_dropped, 1);
    }

    #[test]
    fn duplicate_rows_without_entity_collapse_before_numbering() {
        let raw = vec![
            row(&[("amount", FieldValue::Integer(5))]),
            row(&[("amount", FieldValue::Integer(5))]),
            row(&[("amount", FieldValue::Integer(6))]),
        ];
        let out = canonicalize(&raw);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].entity, "Record 2");
    }

    #[test]
    fn defaulted_rows_collapse_with_explicit_twins() {
        let raw = vec![
            row(&[("entity", text("X")), ("amount", FieldValue::Integer(5))]),
            row(&[
                ("entity", text("X")),
                ("amount", FieldValue::Integer(5)),
                ("department", text(DEFAULT_DEPARTMENT)),
            ]),
            row(&[("amount", FieldValue::Integer(9))]),
            row(&[("entity", text("Record 2")), ("amount", FieldValue::Integer(9))]),
        ];
        let (out, stats) = canonicalize_with_stats(&raw);

        assert_eq!(out.len(), 2);
        assert_eq!(out[1].entity, "Record 2");
        assert_eq!(stats.duplicates_dropped, 2);
        assert_eq!(stats.entity_defaults, 1);
        assert_eq!(stats.department_defaults, 2);
    }

    #[test]
    fn every_identifier_column_is_kept() {
        let raw = vec![row(&[
            ("entity", text("A")),
            ("Aadhaar", FieldValue::Integer(111122223333)),
            ("PAN", text("ABCDE1234F")),
            ("national id", text("abcde1234f")),
        ])];
        let out = canonicalize(&raw);

        assert_eq!(
            out[0].identifier_values(IdentifierKind::NationalId),
            &["abcde1234f".to_string(), "111122223333".to_string()]
        );
        assert!(out[0].extra.is_empty());
    }

    #[test]
    fn extras_filled_and_preserved() {
        let raw = vec![row(&[
            ("entity", text("A")),
            ("Location", FieldValue::Null),
            ("Ref", FieldValue::Integer(7)),
        ])];
        let out = canonicalize(&raw);
        assert_eq!(out[0].extra.get("location"), Some(&text(MISSING_FILL)));
        assert_eq!(out[0].extra.get("ref"), Some(&FieldValue::Integer(7)));
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let raw = vec![
            row(&[
                ("Vendor", text("Acme")),
                ("Program", text("roads")),
                ("Value", text("₹12,000")),
                ("Mobile", text("98765")),
                ("location", text("Pune")),
            ]),
            row(&[("amount", FieldValue::Float(99.5)), ("name", FieldValue::Null)]),
            row(&[("amount", FieldValue::Float(99.5)), ("name", FieldValue::Null)]),
            row(&[("entity", text("X")), ("bank_account", text("UNKNOWN"))]),
            row(&[("entity", text("Y")), ("amount", FieldValue::Integer(5)), ("department", FieldValue::Null)]),
            row(&[("entity", text("Y")), ("amount", FieldValue::Integer(5)), ("department", text(DEFAULT_DEPARTMENT))]),
            row(&[("amount", FieldValue::Integer(7))]),
            row(&[("entity", text("Record 5")), ("amount", FieldValue::Integer(7))]),
            row(&[("aadhaar", text("1111")), ("pan", text("PANX"))]),
        ];
        let once = canonicalize(&raw);
        assert_eq!(once.len(), 6);
        let again_raw: Vec<RawRecord> = once.iter().map(CanonicalRecord::to_raw).collect();
        let twice = canonicalize(&again_raw);

        assert_eq!(once, twice);
    }
}
