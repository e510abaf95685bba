use std::io::Read;
use std::path::Path;

use tracing::{debug, info};
use vigil_core::{FieldValue, RawRecord, RawRecordSet, VigilError};

use super::is_na;

pub struct CsvImporter;

impl CsvImporter {
    pub fn import(path: &Path) -> Result<RawRecordSet, VigilError> {
        let file = std::fs::File::open(path).map_err(VigilError::Io)?;
        let records = Self::from_reader(file)?;
        info!("Imported {} rows from {}", records.len(), path.display());
        Ok(records)
    }

    /// Parse CSV from any reader. The first row is the header.
    ///
    /// Cells are decoded as UTF-8, falling back to Latin-1 per cell, and
    /// typed by inference. Short rows yield `Null` for the missing cells.
    pub fn from_reader<R: Read>(reader: R) -> Result<RawRecordSet, VigilError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let mut latin1_cells = 0usize;
        let headers: Vec<String> = rdr
            .byte_headers()
            .map_err(|e| VigilError::Parse(e.to_string()))?
            .iter()
            .map(|h| decode_cell(h, &mut latin1_cells))
            .collect();

        let mut records = Vec::new();
        for result in rdr.byte_records() {
            let row = result.map_err(|e| VigilError::Parse(e.to_string()))?;
            let mut record = RawRecord::new();
            for (i, header) in headers.iter().enumerate() {
                let value = match row.get(i) {
                    Some(bytes) => infer_cell(&decode_cell(bytes, &mut latin1_cells)),
                    None => FieldValue::Null,
                };
                // Duplicate headers: first column wins.
                record.fields.entry(header.clone()).or_insert(value);
            }
            records.push(record);
        }

        if latin1_cells > 0 {
            debug!(cells = latin1_cells, "decoded non-UTF-8 cells as Latin-1");
        }
        Ok(records)
    }
}

fn decode_cell(bytes: &[u8], latin1_cells: &mut usize) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            *latin1_cells += 1;
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

/// Infer a typed value from cell text.
///
/// Digit strings with a leading zero stay text so identifiers such as
/// account numbers keep their exact spelling.
fn infer_cell(text: &str) -> FieldValue {
    if is_na(text) {
        return FieldValue::Null;
    }
    let t = text.trim();

    let leading_zero = t.len() > 1 && t.starts_with('0') && !t.starts_with("0.");
    if !leading_zero {
        if let Ok(i) = t.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        if let Ok(f) = t.parse::<f64>() {
            if f.is_finite() {
                return FieldValue::Float(f);
            }
        }
    }
    match t.to_lowercase().as_str() {
        "true" => FieldValue::Boolean(true),
        "false" => FieldValue::Boolean(false),
        _ => FieldValue::Text(text.to_string()),
    }
}
