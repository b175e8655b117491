/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which converts to the
/// appropriate status code.
///
/// Two deliberate indistinguishabilities are enforced at this layer:
///
/// - login failure reads the same whether the email was unknown or the
///   password was wrong (no account-enumeration signal), and
/// - `NotFound` is the single outcome for a missing resource, a resource
///   owned by someone else, and a malformed id.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskfence_shared::auth::password::PasswordError;
use taskfence_shared::auth::token::TokenError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Uniform message for failed logins, regardless of which credential was wrong
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400) - malformed input, duplicate email, bad credentials
    BadRequest(String),

    /// Bad request (400) - per-field validation failures
    Validation(Vec<FieldError>),

    /// Unauthorized (401) - missing, invalid, expired, or revoked token
    Unauthorized(String),

    /// Not found (404) - missing id, non-owned resource, or malformed id
    NotFound(String),

    /// Internal server error (500)
    Internal(String),
}

/// A single field validation failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional per-field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Maps a named constraint violation to a client-facing error
///
/// The email unique violation gets its own message; any other constraint is
/// logged server-side and reported generically — internal constraint names
/// never reach the client.
fn constraint_error(constraint: &str) -> ApiError {
    if constraint.contains("email") {
        return ApiError::BadRequest("Email already in use".to_string());
    }

    tracing::warn!(constraint, "Constraint violation");
    ApiError::BadRequest("Request violates a data constraint".to_string())
}

/// Convert sqlx errors to API errors
///
/// A unique-constraint violation on email surfaces as a 400, matching the
/// validation failure class; everything else from the store is internal and
/// propagates rather than being absorbed.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    return constraint_error(constraint);
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert JSON body rejections to API errors
///
/// A body that fails to deserialize — missing field, malformed JSON, wrong
/// content type — is a client error of the validation class, so it reads as
/// 400 rather than axum's default 422.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Convert token errors to API errors
///
/// Every token failure mode — structural, expired, or revoked — reads as the
/// same 401; only store-layer failures become 500s.
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Store(e) => ApiError::from(e),
            TokenError::CreateError(msg) => ApiError::Internal(msg),
            TokenError::Invalid(_) | TokenError::Expired | TokenError::Revoked => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        let errors: Vec<FieldError> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::Validation(errors)
    }
}
