//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated with
//! `mockall` for unit tests.
//!
//! - [`UrlRepository`] - Short link lookups, creation, update and soft delete
//! - [`AccessRepository`] - Redirect access log and click counter
//! - [`UserRepository`] - User accounts

pub mod access_repository;
pub mod url_repository;
pub mod user_repository;

pub use access_repository::AccessRepository;
pub use url_repository::UrlRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use access_repository::MockAccessRepository;
#[cfg(test)]
pub use url_repository::MockUrlRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
