//! Handlers for account registration and login.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::api::extract::ValidJson;
use crate::error::AppError;
use crate::state::AppState;

/// Creates an account and returns an access token.
///
/// # Endpoint
///
/// `POST /api/auth/register`
///
/// ```json
/// { "email": "alice@example.com", "password": "at-least-8-chars" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "token": "eyJ...", "user": { "id": 1, "email": "alice@example.com" } }
/// ```
///
/// # Errors
///
/// - 400 for an invalid email or a password shorter than 8 characters
/// - 409 if the email is already registered
pub async fn register_handler(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let session = state
        .auth_service
        .register(&payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Exchanges credentials for an access token.
///
/// # Endpoint
///
/// `POST /api/auth/login`
///
/// # Errors
///
/// Returns 401 "Invalid credentials" for an unknown email or wrong password.
pub async fn login_handler(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let session = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(session.into()))
}
