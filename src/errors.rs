use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::{DomainError, FieldError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Invalid input")]
    InvalidInput(Vec<FieldError>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::NotFound => AppError::NotFound,
            DomainError::InvalidInput(fields) => AppError::InvalidInput(fields),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::InvalidInput(fields) => serde_json::json!({
                "error": self.to_string(),
                "fields": fields,
            }),
            AppError::Internal(detail) => {
                log::error!("Request failed: {}", detail);
                serde_json::json!({ "error": "Internal server error" })
            }
            AppError::Unauthorized | AppError::NotFound | AppError::Conflict(_) => {
                serde_json::json!({ "error": self.to_string() })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
