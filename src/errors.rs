use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// HTTP-facing error type. Mirrors the pipeline's failure taxonomy onto
/// status codes; upstream catalog failures keep the remote's original
/// status so callers can tell transient from permanent failures apart.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Write was not persisted: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::UnknownProduct(ids) => AppError::UnknownProduct(ids),
            DomainError::Upstream { status, message } => AppError::Upstream { status, message },
            DomainError::Persistence(msg) => AppError::Persistence(msg),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::UnknownProduct(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Internal details stay out of responses.
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Persistence(_) => "Failed to save changes, try later.".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}
