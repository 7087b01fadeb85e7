//! Bearer token authentication.
//!
//! Two flavours:
//!
//! - [`layer`] - route middleware that rejects unauthenticated requests
//! - [`OptionalAuthUser`] - extractor for routes open to anonymous callers

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Id of the authenticated caller, inserted by [`layer`] into request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
}

/// Requires a valid Bearer token.
///
/// ```text
/// Authorization: Bearer <jwt>
/// ```
///
/// On success the caller is available to handlers as `Extension<AuthUser>`.
///
/// # Errors
///
/// Returns `401 Unauthorized` (with `WWW-Authenticate: Bearer`) if the header is
/// missing or malformed, or the token is invalid or expired.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let id = st.auth_service.authenticate(&token)?;
    parts.extensions.insert(AuthUser { id });

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// The caller's id when a valid Bearer token is present.
///
/// Never rejects: a missing, malformed or invalid token yields `None`.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<i64>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(AuthBearer(token)) = AuthBearer::from_request_parts(parts, &()).await else {
            return Ok(Self(None));
        };

        Ok(Self(state.auth_service.authenticate(&token).ok()))
    }
}
