//! Access event passed from the redirect handler to the background worker.

use crate::domain::entities::NewUrlAccess;

/// In-memory record of a redirect waiting to be persisted.
///
/// Created in the redirect handler, sent over a bounded channel, and turned into a
/// [`NewUrlAccess`] by [`crate::domain::access_worker::run_access_worker`]. The
/// HTTP response never waits for the database write.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessEvent {
    pub url_id: i64,
    pub short_code: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AccessEvent {
    /// Creates a new access event.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let event = AccessEvent::new(42, "Ab3dE9".to_string(), Some("10.0.0.1".to_string()), Some("curl/8.0"));
    /// ```
    pub fn new(
        url_id: i64,
        short_code: String,
        ip_address: Option<String>,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            url_id,
            short_code,
            ip_address,
            user_agent: user_agent.map(|s| s.to_string()),
        }
    }

    /// Converts the event into the storage input for the access log.
    ///
    /// IP addresses longer than 45 characters (the IPv6 text maximum) are dropped.
    pub fn to_new_access(&self) -> NewUrlAccess {
        NewUrlAccess {
            shortened_url_id: self.url_id,
            ip_address: self.ip_address.clone().filter(|ip| ip.len() <= 45),
            user_agent: self.user_agent.clone(),
        }
    }
}
