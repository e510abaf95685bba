pub mod config;
pub mod error;
pub mod identifier;
pub mod record;
pub mod report;
pub mod signal;

pub use config::{AnomalyBackend, AnomalyConfig, Config, RuntimeConfig, ScoringSourceConfig};
pub use error::*;
pub use identifier::*;
pub use record::*;
pub use report::*;
pub use signal::*;
