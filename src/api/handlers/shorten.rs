//! Handler for the shortening endpoint.

use axum::{Json, extract::State};

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::extract::ValidJson;
use crate::api::middleware::auth::OptionalAuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Shortens a URL, anonymously or on behalf of the caller.
///
/// # Endpoint
///
/// `POST /api/urls/shorten` (Bearer token optional)
///
/// # Request Body
///
/// ```json
/// { "original_url": "https://example.com/very/long/path" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "original_url": "https://example.com/very/long/path",
///   "short_url": "http://localhost:3000/Ab3dE9",
///   "short_code": "Ab3dE9"
/// }
/// ```
///
/// An authenticated caller resubmitting a URL they already shortened gets the
/// existing link back. An invalid token is treated as no token.
///
/// # Errors
///
/// Returns 400 if `original_url` is missing or not a URL.
pub async fn shorten_handler(
    State(state): State<AppState>,
    OptionalAuthUser(owner_id): OptionalAuthUser,
    ValidJson(payload): ValidJson<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    let result = state
        .shortener_service
        .shorten(&payload.original_url, owner_id)
        .await?;

    Ok(Json(result.into()))
}
