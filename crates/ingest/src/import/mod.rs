mod csv;
mod json;

use std::path::Path;

use vigil_core::{RawRecordSet, VigilError};

pub use self::csv::CsvImporter;
pub use self::json::JsonImporter;

/// Cell texts treated as missing on import.
const NA_VALUES: &[&str] = &["", "na", "n/a", "nan", "null", "none", "undefined", "#n/a"];

pub(crate) fn is_na(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    NA_VALUES.contains(&t.as_str())
}

/// Read a dataset file, choosing the importer from the file extension.
///
/// Only `.csv` and `.json` are accepted; anything else is an input error and
/// no scoring is attempted.
pub fn load_dataset(path: &Path) -> Result<RawRecordSet, VigilError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => CsvImporter::import(path),
        "json" => JsonImporter::import(path),
        _ => Err(VigilError::UnsupportedInput(format!(
            "expected a .csv or .json file, got '{}'",
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
        ))),
    }
}
