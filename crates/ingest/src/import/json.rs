use std::path::Path;

use serde_json::Value;
use tracing::info;
use vigil_core::{FieldValue, RawRecord, RawRecordSet, VigilError};

/// Imports a JSON array of flat objects.
pub struct JsonImporter;

impl JsonImporter {
    pub fn import(path: &Path) -> Result<RawRecordSet, VigilError> {
        let bytes = std::fs::read(path).map_err(VigilError::Io)?;
        let records = Self::from_slice(&bytes)?;
        info!("Imported {} rows from {}", records.len(), path.display());
        Ok(records)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<RawRecordSet, VigilError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| VigilError::Parse(e.to_string()))?;

        let Value::Array(items) = value else {
            return Err(VigilError::Parse(
                "expected a JSON array of objects".to_string(),
            ));
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(RawRecord::from_pairs(
                    map.iter().map(|(k, v)| (k.clone(), json_to_field_value(v))),
                )),
                _ => Err(VigilError::Parse(format!("element {} is not an object", i))),
            })
            .collect()
    }
}

fn json_to_field_value(v: &Value) -> FieldValue {
    match v {
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => FieldValue::Integer(i),
            (None, Some(f)) => FieldValue::Float(f),
            _ => FieldValue::Text(n.to_string()),
        },
        Value::Bool(b) => FieldValue::Boolean(*b),
        Value::Null => FieldValue::Null,
        // Nested values are kept as their JSON text.
        other => FieldValue::Text(other.to_string()),
    }
}
