use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid record shape: {0}")]
    InvalidRecordShape(String),

    #[error("malformed bundle entry {index}: {reason}")]
    MalformedEntry { index: usize, reason: String },

    #[error("invalid model for '{type_name}': {reason}")]
    InvalidModel { type_name: String, reason: String },

    #[error("invalid field path: {0}")]
    InvalidPath(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
