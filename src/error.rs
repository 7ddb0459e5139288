// =============================================================================
// ERROR MODULE
// =============================================================================
// This module defines custom error types and their HTTP responses.
//
// LEARNING NOTES:
// - Rust doesn't have exceptions; it uses Result<T, E> for error handling
// - thiserror crate makes defining error types easy
// - We convert our errors to HTTP responses using Axum's IntoResponse
//
// ERROR HANDLING PHILOSOPHY:
// - Form validation is not an exception: it comes back as a field map (422)
// - Backend failures are translated into friendly messages before they
//   reach the admin (asset_console::friendly)
// - Internal details are logged, not returned
// =============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use asset_console::friendly::{self, FailureKind};
use asset_console::models::ErrorResponse;
use asset_console::validation::FieldErrors;

// =============================================================================
// CUSTOM ERROR TYPE
// =============================================================================
#[derive(Debug, Error)]
pub enum AppError {
    /// Query or stored procedure call against the backend failed
    #[error("Backend error: {0}")]
    Database(#[from] sqlx::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data (bad query parameter, unknown path segment)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The submitted form has field errors
    #[error("Form has {} invalid field(s)", .0.len())]
    Validation(FieldErrors),

    /// The same form is already being submitted
    #[error("A submission for this form is already in progress")]
    SubmissionInProgress,
}

/// Status and code for a failed backend call, picked from the message text.
fn backend_failure(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    let raw = match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "BACKEND_UNAVAILABLE",
                friendly::MSG_NETWORK.to_string(),
            );
        }
        sqlx::Error::RowNotFound => {
            return (StatusCode::NOT_FOUND, "NOT_FOUND", "Record not found".to_string());
        }
        other => other.to_string(),
    };

    match friendly::classify(&raw) {
        FailureKind::Network => (
            StatusCode::SERVICE_UNAVAILABLE,
            "BACKEND_UNAVAILABLE",
            friendly::friendly_message(&raw),
        ),
        FailureKind::Permission => (
            StatusCode::FORBIDDEN,
            "PERMISSION_DENIED",
            friendly::friendly_message(&raw),
        ),
        FailureKind::Duplicate => (
            StatusCode::CONFLICT,
            "ALREADY_IN_USE",
            friendly::friendly_message(&raw),
        ),
        // Procedures raise business-rule violations (e.g. "location is still
        // referenced") as plain exceptions; pass them through verbatim.
        FailureKind::Other if matches!(err, sqlx::Error::Database(_)) => {
            (StatusCode::BAD_REQUEST, "BACKEND_REJECTED", raw)
        }
        FailureKind::Other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "A database error occurred".to_string(),
        ),
    }
}

// =============================================================================
// HTTP RESPONSE CONVERSION
// =============================================================================
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AppError::Validation(errors) => {
                tracing::debug!(fields = errors.len(), "Form rejected by validation");
                let details = serde_json::to_value(errors).unwrap_or_default();
                let body = ErrorResponse::with_details(
                    "VALIDATION_FAILED",
                    "Please correct the highlighted fields",
                    details,
                );
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            }

            AppError::Database(err) => backend_failure(err),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),

            AppError::SubmissionInProgress => (
                StatusCode::CONFLICT,
                "SUBMISSION_IN_PROGRESS",
                self.to_string(),
            ),
        };

        // Log the original error, not the friendly text
        tracing::error!(
            error_code = error_code,
            status = status.as_u16(),
            error = %self,
            "Request failed"
        );

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use asset_console::validation::FormField;

    #[test]
    fn test_validation_errors_map_to_422() {
        let mut errors = FieldErrors::new();
        errors.insert(FormField::Email, "Please enter an email address");
        let response = AppError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_submission_in_progress_is_conflict() {
        let response = AppError::SubmissionInProgress.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_pool_timeout_is_reported_as_unavailable() {
        let (status, code, message) = backend_failure(&sqlx::Error::PoolTimedOut);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "BACKEND_UNAVAILABLE");
        assert_eq!(message, friendly::MSG_NETWORK);
    }

    #[test]
    fn test_row_not_found_is_404() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
