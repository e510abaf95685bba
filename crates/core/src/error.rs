use thiserror::Error;

#[derive(Error, Debug)]
pub enum VigilError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrong file type or an unreadable input format.
    #[error("Invalid file type: {0}")]
    UnsupportedInput(String),

    #[error("The uploaded dataset contains no data.")]
    EmptyDataset,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal processing error: {0}")]
    Internal(String),
}

impl VigilError {
    /// Input errors are surfaced to the caller verbatim; everything else is
    /// reported as a generic processing failure.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            VigilError::Io(_)
                | VigilError::UnsupportedInput(_)
                | VigilError::EmptyDataset
                | VigilError::Parse(_)
        )
    }
}
