//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health` and `GET /api/health`
///
/// # Response Codes
///
/// - **200 OK**: all components healthy
/// - **503 Service Unavailable**: one or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: `SELECT 1`
/// 2. **Access Queue**: channel open, remaining capacity
/// 3. **Cache**: Redis PING (always ok when caching is disabled)
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = match state.shortener_service.check_storage().await {
        Ok(()) => CheckStatus::ok("Connected"),
        Err(e) => CheckStatus::error(format!("Database error: {}", e)),
    };

    let access_queue = if state.access_sender.is_closed() {
        CheckStatus::error("Access queue is closed")
    } else {
        CheckStatus::ok(format!(
            "Capacity: {}/{}",
            state.access_sender.capacity(),
            state.access_sender.max_capacity()
        ))
    };

    let cache = if state.cache.health_check().await {
        CheckStatus::ok("Available")
    } else {
        CheckStatus::error("Cache connection failed")
    };

    let all_healthy = database.is_ok() && access_queue.is_ok() && cache.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        checks: HealthChecks {
            database,
            access_queue,
            cache,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
