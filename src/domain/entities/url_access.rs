//! Access log entry recorded for every resolved redirect.

use chrono::{DateTime, Utc};

/// An immutable record of one redirect through a short link.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlAccess {
    pub id: i64,
    pub shortened_url_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub accessed_at: DateTime<Utc>,
}

/// Input data for recording an access. The timestamp is set by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUrlAccess {
    pub shortened_url_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
