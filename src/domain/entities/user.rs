//! User account entity.

use chrono::{DateTime, Utc};

/// A registered user who can own short links.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Argon2 PHC string; never serialized to clients.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Input data for creating a user. The password must already be hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}
