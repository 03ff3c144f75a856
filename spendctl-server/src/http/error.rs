//! API error types with IntoResponse
//!
//! Every error becomes `{"error": "<message>"}` with a matching status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::ValidationError;

/// Message for rejected expense writes (bad fields or unknown user alike)
pub const EXPENSE_REJECTED: &str = "Bad Request";

/// Message for an unusable path identifier
pub const BAD_ID: &str = "Bad request";

/// Message for a missing record, whatever the resource
pub const NOT_FOUND: &str = "Not found";

const INTERNAL: &str = "Internal Server Error";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Request could not be used as sent (400)
    BadRequest { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: i64 },

    /// Database error (500, logged)
    Database(DbError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound { resource, id }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Validation(e) => e.to_string(),
            Self::BadRequest { message } => message,
            Self::NotFound { resource, id } => {
                tracing::debug!(resource, id, "record not found");
                NOT_FOUND.to_owned()
            }
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                INTERNAL.to_owned()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Database(e)
    }
}
