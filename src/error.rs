use thiserror::Error;

/// Errors raised by feature extraction, model fitting and plan generation.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid patient record: {field} {reason}")]
    InvalidRecord { field: String, reason: String },

    #[error("Model has not been trained")]
    ModelNotTrained,

    #[error("Insufficient training data: {0}")]
    InsufficientData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Model bundle schema mismatch: expected {expected}, found {found}")]
    IncompatibleModel { expected: String, found: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalysisError {
    pub(crate) fn invalid_record(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
