use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Failed to decode payload: {0}")]
    DecodeError(String),

    #[error("Unit conversion failed for {field}: {reason}")]
    ConversionFault { field: &'static str, reason: String },

    #[error("Failed to encode record: {0}")]
    EncodeError(#[from] serde_json::Error),

    #[error("Publish error: {0}")]
    PublishError(#[from] anyhow::Error),
}

impl DomainError {
    /// Whether redelivering the same message could succeed.
    ///
    /// Decode failures are permanent: the payload itself is malformed and a
    /// retry will see the same bytes. Conversion, encode, and publish failures
    /// depend on values or infrastructure and are worth redelivering.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DomainError::DecodeError(_))
    }
}
