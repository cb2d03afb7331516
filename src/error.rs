//! Error types for the rental server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::rental::RentalConflict;

/// Numeric error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchData = 4,
    BadValue = 5,
    InvalidPeriod = 6,
    DuplicateEquipment = 7,
    EmptySelection = 8,
    EquipmentUnavailable = 9,
    SchedulingConflict = 10,
    StorageFailure = 11,
    LookupFailure = 12,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("The same equipment cannot be rented more than once in a rental")]
    DuplicateEquipment,

    #[error("Every line item must select an equipment unit")]
    EmptySelection,

    #[error("Equipment unavailable: {}", .0.join(", "))]
    Unavailable(Vec<String>),

    #[error("Scheduling conflict with {} active rental(s)", .0.len())]
    SchedulingConflict(Vec<RentalConflict>),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Lookup failure: {0}")]
    Lookup(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Reclassify a database failure that happened while reading availability inputs.
    ///
    /// Callers must be able to tell "unknown, retry" apart from "known unavailable".
    pub fn into_lookup(self) -> Self {
        match self {
            AppError::Database(e) => AppError::Lookup(e.to_string()),
            other => other,
        }
    }

    /// Reclassify a database failure raised by an atomic rental/invoice write.
    pub fn into_storage(self) -> Self {
        match self {
            AppError::Database(e) => AppError::Storage(e.to_string()),
            other => other,
        }
    }

    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::InvalidPeriod(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidPeriod),
            AppError::DuplicateEquipment => {
                (StatusCode::BAD_REQUEST, ErrorCode::DuplicateEquipment)
            }
            AppError::EmptySelection => (StatusCode::BAD_REQUEST, ErrorCode::EmptySelection),
            AppError::Unavailable(_) => (StatusCode::CONFLICT, ErrorCode::EquipmentUnavailable),
            AppError::SchedulingConflict(_) => {
                (StatusCode::CONFLICT, ErrorCode::SchedulingConflict)
            }
            AppError::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::StorageFailure)
            }
            AppError::Lookup(_) => (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::LookupFailure),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Structured details (unavailable equipment names, conflicting rentals)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, details) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage failure: {}", msg);
                (self.to_string(), None)
            }
            AppError::Lookup(msg) => {
                tracing::warn!("Lookup failure: {}", msg);
                (
                    "Availability could not be determined, please retry".to_string(),
                    None,
                )
            }
            AppError::Unavailable(names) => (self.to_string(), Some(serde_json::json!(names))),
            AppError::SchedulingConflict(conflicts) => {
                (self.to_string(), serde_json::to_value(conflicts).ok())
            }
            _ => (self.to_string(), None),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
