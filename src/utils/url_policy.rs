//! Destination URL policy for shortened links.

use url::Url;
use validator::ValidationError;

/// Schemes a short link may redirect to.
pub const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Returns `true` for absolute `http`, `https` or `ftp` URLs with a host.
///
/// Script-bearing and local schemes such as `javascript:`, `data:` and
/// `file:` are rejected even though they parse as URLs.
pub fn is_allowed_destination(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => ALLOWED_SCHEMES.contains(&url.scheme()) && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// `validator` hook for destination URL fields.
///
/// Empty input is left to the `length` rule so it reports as missing.
pub fn validate_destination(input: &str) -> Result<(), ValidationError> {
    if input.is_empty() || is_allowed_destination(input) {
        return Ok(());
    }

    Err(ValidationError::new("url").with_message("Invalid URL format".into()))
}
