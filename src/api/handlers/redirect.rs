//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, warn};

use crate::domain::access_event::AccessEvent;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheEntry, CachedLink};
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::code_generator::is_valid_code;

/// Redirects a short code to its destination.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Reject codes that cannot exist (wrong length or characters)
/// 2. Check the cache; on a miss query the database and fill the cache
/// 3. Queue an access event for the background worker
/// 4. Return `302 Found`
///
/// A cache error falls back to the database. A cached tombstone answers 404
/// without a query. The fill never overwrites an existing entry, so a read
/// that raced an update or delete cannot replace the newer entry. A full
/// access queue drops the event; the redirect still succeeds.
///
/// # Errors
///
/// Returns 404 for unknown and soft-deleted codes.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    if !is_valid_code(&code) {
        return Err(AppError::not_found("URL not found", json!({ "code": code })));
    }

    let link = match state.cache.get_link(&code).await {
        Ok(Some(CacheEntry::Live(cached))) => cached,
        Ok(Some(CacheEntry::Gone)) => {
            return Err(AppError::not_found("URL not found", json!({ "code": code })));
        }
        Ok(None) => {
            let link = lookup(&state, &code).await?;
            if let Err(e) = state.cache.fill_link(&code, &link).await {
                error!(code = %code, error = %e, "Failed to cache link");
            }
            link
        }
        Err(e) => {
            error!(code = %code, error = %e, "Cache error, falling back to database");
            lookup(&state, &code).await?
        }
    };

    let event = AccessEvent::new(
        link.id,
        code,
        Some(client_ip(&headers, addr, state.behind_proxy)),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
    );

    match state.access_sender.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            metrics::counter!("linkshort_access_events_dropped_total").increment(1);
            warn!(code = %event.short_code, "Access queue full, dropping event");
        }
        Err(TrySendError::Closed(event)) => {
            error!(code = %event.short_code, "Access queue closed, dropping event");
        }
    }

    metrics::counter!("linkshort_redirects_total").increment(1);
    debug!(id = link.id, "Redirecting");

    Ok((StatusCode::FOUND, [(header::LOCATION, link.original_url)]).into_response())
}

async fn lookup(state: &AppState, code: &str) -> Result<CachedLink, AppError> {
    let url = state.shortener_service.resolve(code).await?;
    Ok(CachedLink {
        id: url.id,
        original_url: url.original_url,
    })
}
