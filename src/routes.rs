//! Top-level router.
//!
//! # Route Structure
//!
//! - `GET  /{code}`  - Short link redirect (public)
//! - `GET  /health`  - Health check (public)
//! - `/api/*`        - REST API (see [`crate::api::routes`])
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket, stricter on authenticated routes
//! - **Authentication** - Bearer JWT on management routes
//! - **Path normalization** - Trailing slash trimming

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
///
/// Rate limiting keys on forwarded client addresses when
/// `state.behind_proxy` is set, and on the socket peer otherwise.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let behind_proxy = state.behind_proxy;

    let protected = rate_limit::apply(
        api::routes::protected_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer)),
        rate_limit::SECURE,
        behind_proxy,
    );

    let public = rate_limit::apply(
        Router::new()
            .route("/{code}", get(redirect_handler))
            .route("/health", get(health_handler)),
        rate_limit::PUBLIC,
        behind_proxy,
    );

    let api_public = rate_limit::apply(
        api::routes::public_routes(),
        rate_limit::PUBLIC,
        behind_proxy,
    );

    let router = public
        .nest("/api", api_public.merge(protected))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
