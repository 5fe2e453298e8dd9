use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { key: String, needed: usize, quota: usize },
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage io error: {0}")]
    Io(String),
}

impl ServiceError {
    /// Failures that leave no sensible way to answer locally.
    pub fn is_storage_fatal(&self) -> bool {
        !matches!(self, ServiceError::Validation(_))
    }
}

impl From<models::ModelError> for ServiceError {
    fn from(e: models::ModelError) -> Self {
        match e {
            models::ModelError::Validation(msg) => ServiceError::Validation(msg),
            models::ModelError::Payload(err) => ServiceError::Serialization(err.to_string()),
        }
    }
}
