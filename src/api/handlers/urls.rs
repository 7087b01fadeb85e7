//! Handlers for the caller's own links (list, update, delete).
//!
//! All routes sit behind [`crate::api::middleware::auth::layer`]. A link that
//! belongs to someone else is reported as not found.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use tracing::warn;

use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::api::dto::urls::{DeleteResponse, UpdateUrlRequest, UrlListResponse, UrlResponse};
use crate::api::extract::ValidJson;
use crate::api::middleware::auth::AuthUser;
use crate::error::AppError;
use crate::infrastructure::cache::CachedLink;
use crate::state::AppState;

/// Lists the caller's live links, newest first.
///
/// # Endpoint
///
/// `GET /api/urls?page=1&page_size=25`
///
/// # Response
///
/// ```json
/// {
///   "pagination": { "page": 1, "page_size": 25, "total_items": 1, "total_pages": 1 },
///   "items": [
///     {
///       "id": 1,
///       "original_url": "https://example.com",
///       "short_code": "Ab3dE9",
///       "short_url": "http://localhost:3000/Ab3dE9",
///       "click_count": 3,
///       "created_at": "2025-01-01T00:00:00Z",
///       "updated_at": "2025-01-02T00:00:00Z"
///     }
///   ]
/// }
/// ```
pub async fn list_urls_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<UrlListResponse>, AppError> {
    let page = params.validate()?;
    let service = &state.shortener_service;

    let total = service.count_for_owner(user.id).await?;
    let urls = service
        .list_for_owner(user.id, page.offset(), page.limit())
        .await?;

    let items = urls
        .into_iter()
        .map(|url| {
            let short_url = service.short_url(&url.short_code);
            UrlResponse::new(url, short_url)
        })
        .collect();

    Ok(Json(UrlListResponse {
        pagination: PaginationMeta::new(page, total),
        items,
    }))
}

/// Changes the destination of one of the caller's links.
///
/// # Endpoint
///
/// `PUT /api/urls/{id}` with `{ "original_url": "https://..." }`
///
/// # Errors
///
/// - 400 if the URL is missing or invalid
/// - 404 if the link is unknown, deleted, or not owned by the caller
pub async fn update_url_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<UpdateUrlRequest>,
) -> Result<Json<UrlResponse>, AppError> {
    let updated = state
        .shortener_service
        .update_for_owner(id, user.id, &payload.original_url)
        .await?;

    let cached = CachedLink {
        id: updated.id,
        original_url: updated.original_url.clone(),
    };
    if let Err(e) = state.cache.set_link(&updated.short_code, &cached).await {
        warn!(code = %updated.short_code, error = %e, "Failed to refresh cached link");
    }

    let short_url = state.shortener_service.short_url(&updated.short_code);
    Ok(Json(UrlResponse::new(updated, short_url)))
}

/// Soft-deletes one of the caller's links.
///
/// # Endpoint
///
/// `DELETE /api/urls/{id}`
///
/// The code stops redirecting immediately and is never reissued. The cache
/// keeps a tombstone for it until the entry expires.
///
/// # Errors
///
/// Returns 404 if the link is unknown, already deleted, or not owned by the caller.
pub async fn delete_url_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = state
        .shortener_service
        .delete_for_owner(id, user.id)
        .await?;

    if let Err(e) = state.cache.mark_gone(&deleted.short_code).await {
        warn!(code = %deleted.short_code, error = %e, "Failed to mark cached link gone");
    }

    Ok(Json(DeleteResponse::deleted()))
}
