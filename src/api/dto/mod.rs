//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs derive `validator::Validate`; handlers receive them through
//! [`crate::api::extract::ValidJson`], so every body is checked before use.

pub mod auth;
pub mod health;
pub mod pagination;
pub mod shorten;
pub mod urls;
