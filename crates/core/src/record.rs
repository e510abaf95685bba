use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::identifier::IdentifierKind;

/// Placeholder written into pass-through columns whose cell was missing.
pub const MISSING_FILL: &str = "UNKNOWN";

/// Typed cell values. CSV cells arrive as strings but are inferred on import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl FieldValue {
    /// Extract as string, returning None for non-text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Null or whitespace-only text.
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the value as trimmed text, or None when missing.
    ///
    /// Whole floats render without a fractional part so that an identifier
    /// read as `9999999999.0` matches the same identifier read as text.
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{:.0}", f))
                } else {
                    Some(f.to_string())
                }
            }
            FieldValue::Boolean(b) => Some(b.to_string()),
        }
    }

    /// Type-tagged token used for exact-duplicate detection.
    pub fn dedup_token(&self) -> String {
        match self {
            FieldValue::Text(s) => format!("t:{}", s),
            FieldValue::Integer(i) => format!("i:{}", i),
            FieldValue::Float(f) => format!("f:{}", f.to_bits()),
            FieldValue::Boolean(b) => format!("b:{}", b),
            FieldValue::Null => "n".to_string(),
        }
    }
}

/// One input row exactly as received: column name → cell, in column order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawRecord {
    pub fields: IndexMap<String, FieldValue>,
}

/// Ordered rows as received at the ingestion boundary.
pub type RawRecordSet = Vec<RawRecord>;

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs, keeping their order.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: FieldValue) {
        self.fields.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Normalized representation of one input row with a fixed required schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalRecord {
    pub entity: String,
    pub department: String,
    pub amount: f64,
    /// Lower-cased, trimmed identifier values keyed by kind, distinct and in
    /// synonym-column order. A kind is absent rather than mapped to an empty list.
    pub identifiers: BTreeMap<IdentifierKind, Vec<String>>,
    /// Every other column, passed through uninterpreted.
    pub extra: IndexMap<String, FieldValue>,
}

impl CanonicalRecord {
    /// First value recorded for `kind`.
    pub fn identifier(&self, kind: IdentifierKind) -> Option<&str> {
        self.identifier_values(kind).first().map(String::as_str)
    }

    pub fn identifier_values(&self, kind: IdentifierKind) -> &[String] {
        self.identifiers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rendered text of a pass-through column, if the column exists.
    pub fn extra_text(&self, column: &str) -> Option<String> {
        self.extra.get(column).and_then(FieldValue::render)
    }

    /// Re-express this record as a raw row using canonical column names.
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord::new();
        raw.insert("entity", FieldValue::Text(self.entity.clone()));
        raw.insert("department", FieldValue::Text(self.department.clone()));
        raw.insert("amount", FieldValue::Float(self.amount));
        // Values never outnumber synonyms, so each lands in its own column.
        for (kind, values) in &self.identifiers {
            for (column, value) in kind.column_synonyms().iter().zip(values) {
                raw.insert(*column, FieldValue::Text(value.clone()));
            }
        }
        for (column, value) in &self.extra {
            raw.fields
                .entry(column.clone())
                .or_insert_with(|| value.clone());
        }
        raw
    }
}
