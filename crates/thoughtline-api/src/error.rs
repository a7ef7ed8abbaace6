//! Handler error type. Every failure becomes a status code plus an
//! `{"error": "..."}` body.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use thoughtline_db::DbError;
use thoughtline_types::ValidationError;
use thoughtline_types::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    /// Field constraint or uniqueness violation.
    #[error("{0}")]
    Validation(String),

    /// Malformed identifier, missing body field or unparseable JSON.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Validation failures share 500 with internal errors on this API.
            AppError::Validation(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Internal(msg) => error!("Internal error: {}", msg),
            AppError::Validation(msg) => warn!("Validation failed: {}", msg),
            _ => {}
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(_) => AppError::NotFound(e.to_string()),
            DbError::Conflict(msg) => AppError::Validation(msg),
            DbError::Sqlite(_) | DbError::Lock(_) | DbError::Corrupt(_) => {
                error!("Database error: {}", e);
                AppError::Internal("Internal server error".into())
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
