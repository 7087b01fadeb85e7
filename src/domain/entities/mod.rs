//! Core domain entities.
//!
//! Entities are plain data structures. Each has a companion `New*` struct carrying
//! only the fields supplied at creation time; ids and timestamps come from storage.
//!
//! - [`ShortenedUrl`] - A short code mapped to a destination URL
//! - [`UrlAccess`] - One recorded redirect
//! - [`User`] - An account that can own links

pub mod shortened_url;
pub mod url_access;
pub mod user;

pub use shortened_url::{NewShortenedUrl, ShortenResult, ShortenedUrl};
pub use url_access::{NewUrlAccess, UrlAccess};
pub use user::{NewUser, User};
