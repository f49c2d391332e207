use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeeCalcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Unknown offer: {0}")]
    UnknownOffer(String),

    #[error("Unsupported schema version {found} (this build reads up to {supported})")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FeeCalcError {
    fn from(e: serde_json::Error) -> Self {
        FeeCalcError::SerializationError(e.to_string())
    }
}
