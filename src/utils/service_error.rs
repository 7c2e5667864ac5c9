// Service error taxonomy shared by every core operation
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ephemeral_link::LinkValidity;
use crate::store::{constraints, StoreError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The ephemeral link exists but its validity predicate fails.
    #[error("Link expired: {0:?}")]
    Expired(LinkValidity),

    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServiceError::DatabaseError(msg) => {
                tracing::error!("Store failure surfaced to caller: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage temporarily unavailable".to_string(),
                )
            },
            ServiceError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            ServiceError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            ServiceError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ServiceError::Expired(_) => (StatusCode::GONE, "Link has expired".to_string()),
            ServiceError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::UniqueViolation { constraint } => {
                ServiceError::Conflict(conflict_message(&constraint).to_string())
            },
            StoreError::ForeignKeyViolation(_) => ServiceError::NotFound,
            StoreError::Pool(msg) | StoreError::Database(msg) => ServiceError::DatabaseError(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(error: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(error.to_string())
    }
}

/// Human readable message for a storage-level uniqueness violation
fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        constraints::USERNAME_UNIQUE => "This username is already taken",
        constraints::PAYMENT_METHOD_PROVIDER_UNIQUE => {
            "A payment method of this type already exists"
        },
        constraints::EPHEMERAL_LINK_SLUG_UNIQUE => "Ephemeral link slug collision, please retry",
        _ => "Resource already exists",
    }
}
