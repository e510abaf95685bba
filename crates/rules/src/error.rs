/// Errors raised while loading a scoring document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed but failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for vigil_core::VigilError {
    fn from(e: ConfigError) -> Self {
        vigil_core::VigilError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
