//! DTOs for owner link management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::pagination::PaginationMeta;
use crate::domain::entities::ShortenedUrl;
use crate::utils::url_policy::validate_destination;

/// A link as shown to its owner.
#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub short_url: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UrlResponse {
    pub fn new(url: ShortenedUrl, short_url: String) -> Self {
        Self {
            id: url.id,
            original_url: url.original_url,
            short_code: url.short_code,
            short_url,
            click_count: url.click_count,
            created_at: url.created_at,
            updated_at: url.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UrlListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<UrlResponse>,
}

/// Request to change a link's destination.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUrlRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "URL is required"))]
    #[validate(custom(function = "validate_destination"))]
    pub original_url: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

impl DeleteResponse {
    pub fn deleted() -> Self {
        Self {
            message: "URL deleted successfully".to_string(),
        }
    }
}
