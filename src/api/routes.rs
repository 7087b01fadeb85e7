//! API route configuration, mounted under `/api`.

use crate::api::handlers::{
    delete_url_handler, health_handler, list_urls_handler, login_handler, register_handler,
    shorten_handler, update_url_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

/// Routes open to anonymous callers.
///
/// # Endpoints
///
/// - `POST /auth/register` - Create an account
/// - `POST /auth/login`    - Obtain an access token
/// - `POST /urls/shorten`  - Shorten a URL (token optional)
/// - `GET  /health`        - Health check
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/urls/shorten", post(shorten_handler))
        .route("/health", get(health_handler))
}

/// Routes that require a Bearer token.
///
/// # Endpoints
///
/// - `GET    /urls`      - List own links
/// - `PUT    /urls/{id}` - Change a link's destination
/// - `DELETE /urls/{id}` - Soft-delete a link
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", get(list_urls_handler))
        .route("/urls/{id}", put(update_url_handler).delete(delete_url_handler))
}
