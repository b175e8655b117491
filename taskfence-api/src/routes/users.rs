/// Account and session endpoints
///
/// # Endpoints
///
/// - `POST /v1/users` - Signup (public)
/// - `POST /v1/users/login` - Login (public)
/// - `GET /v1/users/me` - Current user (authenticated)
/// - `DELETE /v1/users/me/token` - Revoke the presented token (authenticated)
///
/// Signup and login respond with the issued bearer token in the
/// `x-auth-token` header; subsequent requests present it as
/// `Authorization: Bearer <token>`.
///
/// Password hashing and verification are CPU-bound, so both run on
/// `spawn_blocking` instead of inline on the request path.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, INVALID_CREDENTIALS},
    extract::JsonBody,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use serde::Deserialize;
use taskfence_shared::{
    auth::{
        password,
        token::{self, AuthSession, TokenScope},
    },
    models::user::{CreateUser, User},
};
use validator::Validate;

/// Response header carrying a freshly issued token
const X_AUTH_TOKEN: &str = "x-auth-token";

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Password
    pub password: String,
}

/// Signup: create an account and open a first session
///
/// # Endpoint
///
/// ```text
/// POST /v1/users
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret1"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the user view as body and the issued token in the
/// `x-auth-token` header.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or email already in use
///
/// The password is hashed exactly here, at the one call site that sets it;
/// nothing re-hashes on unrelated writes.
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();

    let params = state.config.hash;
    let password = req.password;
    let password_hash =
        tokio::task::spawn_blocking(move || password::hash_password(&password, &params))
            .await
            .map_err(|e| ApiError::Internal(format!("Hashing task failed: {}", e)))??;

    // The email UNIQUE constraint turns a duplicate (including a client
    // retry racing itself) into a 400, never a second account.
    let user = User::create(
        &state.db,
        CreateUser {
            email,
            password_hash,
        },
    )
    .await?;

    let issued = token::issue(
        &state.db,
        state.jwt_secret(),
        state.token_ttl(),
        user.id,
        TokenScope::Auth,
    )
    .await?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(X_AUTH_TOKEN, issued)]),
        Json(user.body()),
    ))
}

/// Login: verify credentials and open a new session
///
/// # Endpoint
///
/// ```text
/// POST /v1/users/login
/// ```
///
/// # Response
///
/// `200 OK` with the user view as body and the issued token in the
/// `x-auth-token` header. Each login appends a new entry to the user's
/// session list; concurrent sessions stay independently valid.
///
/// # Errors
///
/// - `400 Bad Request`: wrong email or wrong password — the message is
///   identical for both, so the response carries no account-enumeration
///   signal
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = req.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

    let stored_hash = user.password_hash.clone();
    let password = req.password;
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Verification task failed: {}", e)))??;

    if !valid {
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
    }

    let issued = token::issue(
        &state.db,
        state.jwt_secret(),
        state.token_ttl(),
        user.id,
        TokenScope::Auth,
    )
    .await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        StatusCode::OK,
        AppendHeaders([(X_AUTH_TOKEN, issued)]),
        Json(user.body()),
    ))
}

/// Returns the authenticated user
///
/// # Endpoint
///
/// ```text
/// GET /v1/users/me
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: missing, invalid, expired, or revoked token
pub async fn me(Extension(session): Extension<AuthSession>) -> ApiResult<impl IntoResponse> {
    Ok(Json(session.user.body()))
}

/// Revokes the token presented on this request (logout)
///
/// # Endpoint
///
/// ```text
/// DELETE /v1/users/me/token
/// Authorization: Bearer <token>
/// ```
///
/// Removes the presented token from the user's session list. Idempotent at
/// the service layer; the same token simply stops verifying afterwards.
/// Other concurrent sessions are untouched.
pub async fn revoke_current_token(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<impl IntoResponse> {
    token::revoke(&state.db, session.user.id, &session.token).await?;

    tracing::info!(user_id = %session.user.id, "Session revoked");

    Ok(StatusCode::OK)
}
