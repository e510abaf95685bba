use std::collections::HashMap;

use vigil_core::{CanonicalRecord, MISSING_FILL};

pub const FEATURE_AMOUNT: &str = "amount";
pub const FEATURE_DEPARTMENT: &str = "department";
pub const FEATURE_LOCATION: &str = "location";

/// Numeric features per record, ready for the anomaly scorers.
///
/// Columns: `amount` as-is, then `department` and `location` frequency
/// encoded (each record gets the batch count of its category). `location`
/// is only present when some record carries a `location` column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut columns = vec![FEATURE_AMOUNT.to_string(), FEATURE_DEPARTMENT.to_string()];
        let departments: Vec<String> = records.iter().map(|r| r.department.clone()).collect();
        let mut encoded = vec![frequency_encode(&departments)];

        let has_location = records.iter().any(|r| r.extra.contains_key(FEATURE_LOCATION));
        if has_location {
            let locations: Vec<String> = records
                .iter()
                .map(|r| {
                    r.extra_text(FEATURE_LOCATION)
                        .unwrap_or_else(|| MISSING_FILL.to_string())
                })
                .collect();
            encoded.push(frequency_encode(&locations));
            columns.push(FEATURE_LOCATION.to_string());
        }

        let rows = records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let mut row = Vec::with_capacity(columns.len());
                row.push(r.amount);
                row.extend(encoded.iter().map(|col| col[i]));
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }
}

/// Replace each category with its occurrence count in the batch.
fn frequency_encode(values: &[String]) -> Vec<f64> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v.as_str()).or_default() += 1;
    }
    values.iter().map(|v| counts[v.as_str()] as f64).collect()
}
