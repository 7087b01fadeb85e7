//! Shortened URL entity: the mapping between a short code and a destination.

use chrono::{DateTime, Utc};

/// A stored short link.
///
/// `owner_id` is `None` for anonymous submissions. A row with `deleted_at` set is
/// logically deleted: it no longer resolves, but its code stays reserved.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortenedUrl {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub owner_id: Option<i64>,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ShortenedUrl {
    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if the link belongs to the given user.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }
}

/// Input data for creating a new short link.
///
/// `click_count` always starts at zero, so it is not part of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortenedUrl {
    pub original_url: String,
    pub short_code: String,
    pub owner_id: Option<i64>,
}

/// Outcome of a shorten request as exposed to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortenResult {
    pub original_url: String,
    pub short_code: String,
    pub short_url: String,
    /// False when an existing mapping of the same owner was returned.
    pub created: bool,
}
