//! DTOs for the shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortenResult;
use crate::utils::url_policy::validate_destination;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Destination URL; must be an absolute `http`, `https` or `ftp` URL.
    #[serde(default)]
    #[validate(length(min = 1, message = "URL is required"))]
    #[validate(custom(function = "validate_destination"))]
    pub original_url: String,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub original_url: String,
    pub short_url: String,
    pub short_code: String,
}

impl From<ShortenResult> for ShortenResponse {
    fn from(result: ShortenResult) -> Self {
        Self {
            original_url: result.original_url,
            short_url: result.short_url,
            short_code: result.short_code,
        }
    }
}
