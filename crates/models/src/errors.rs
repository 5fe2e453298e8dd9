use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}
