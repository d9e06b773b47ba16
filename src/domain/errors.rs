use thiserror::Error;

/// Failure taxonomy for the order pipeline. Every layer surfaces its
/// failures with the kind preserved; no layer retries or downgrades an
/// error into a success.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Unknown product: {0}")]
    UnknownProduct(String),
    #[error("Product catalog request failed with status {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("Write was not persisted: {0}")]
    Persistence(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors produced by the price resolver client.
///
/// Partial resolution is not a supported outcome: if the catalog cannot
/// account for every requested id, the whole call fails.
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("Product catalog request failed with status {status}: {message}")]
    UpstreamUnavailable { status: u16, message: String },
    #[error("Product catalog could not resolve ids: {0}")]
    UnknownProduct(String),
    #[error("Product catalog response was malformed: {0}")]
    MalformedResponse(String),
}

impl From<PriceError> for DomainError {
    fn from(e: PriceError) -> Self {
        match e {
            PriceError::UpstreamUnavailable { status, message } => {
                DomainError::Upstream { status, message }
            }
            PriceError::UnknownProduct(ids) => DomainError::UnknownProduct(ids),
            PriceError::MalformedResponse(msg) => DomainError::Internal(msg),
        }
    }
}
