//! Repository trait for short link storage.

use crate::domain::entities::{NewShortenedUrl, ShortenedUrl};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short links.
///
/// "Live" rows are rows whose `deleted_at` is NULL. Every lookup used to serve or
/// manage a link is restricted to live rows; only [`UrlRepository::code_exists`]
/// looks at deleted rows too, because deleted codes stay reserved.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Finds the owner's live mapping for exactly this destination URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_live_by_owner_and_url(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<ShortenedUrl>, AppError>;

    /// Returns true if any row, deleted or not, already uses this code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    /// Inserts a new row in a single atomic write.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` when the row was created
    /// - `Ok(None)` when the short code was taken concurrently (unique constraint)
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn try_create(&self, new_url: NewShortenedUrl)
    -> Result<Option<ShortenedUrl>, AppError>;

    /// Finds a live row by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_live_by_code(&self, code: &str) -> Result<Option<ShortenedUrl>, AppError>;

    /// Lists the owner's live rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_live_by_owner(
        &self,
        owner_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ShortenedUrl>, AppError>;

    /// Counts the owner's live rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_live_by_owner(&self, owner_id: i64) -> Result<i64, AppError>;

    /// Replaces the destination URL of a live row owned by `owner_id`.
    ///
    /// Returns `Ok(None)` if no such row exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_original_url(
        &self,
        id: i64,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<ShortenedUrl>, AppError>;

    /// Soft-deletes a live row owned by `owner_id` by setting `deleted_at = now()`.
    ///
    /// Returns the deleted row, or `Ok(None)` if no such live row exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn soft_delete(&self, id: i64, owner_id: i64) -> Result<Option<ShortenedUrl>, AppError>;

    /// Round-trips to storage; used by health checks.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if storage is unreachable.
    async fn ping(&self) -> Result<(), AppError>;
}
