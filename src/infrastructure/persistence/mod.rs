//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row structs.
//!
//! # Repositories
//!
//! - [`PgUrlRepository`] - Short link storage, lookup and soft delete
//! - [`PgAccessRepository`] - Redirect access log and click counter
//! - [`PgUserRepository`] - User accounts

pub mod pg_access_repository;
pub mod pg_url_repository;
pub mod pg_user_repository;

pub use pg_access_repository::PgAccessRepository;
pub use pg_url_repository::PgUrlRepository;
pub use pg_user_repository::PgUserRepository;
