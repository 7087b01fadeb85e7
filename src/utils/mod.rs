//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`client_ip`] - Client address extraction for access logging
//! - [`password`] - Argon2 password hashing
//! - [`db_error`] - Database error classification
//! - [`url_policy`] - Allowed destination URL schemes

pub mod client_ip;
pub mod code_generator;
pub mod db_error;
pub mod password;
pub mod url_policy;
