//! Ingestion boundary: tabular file import and canonicalization.
//!
//! - [`import`] reads CSV or JSON files into a raw record set.
//! - [`canonical`] maps raw rows onto the fixed canonical schema.

pub mod canonical;
pub mod import;

pub use canonical::{canonicalize, canonicalize_with_stats, CanonicalizeStats};
pub use import::{load_dataset, CsvImporter, JsonImporter};
