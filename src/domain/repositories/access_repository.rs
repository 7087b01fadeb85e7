//! Repository trait for the redirect access log.

use crate::domain::entities::{NewUrlAccess, UrlAccess};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for recording redirects.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAccessRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Inserts the access entry and increments the link's `click_count`.
    ///
    /// Both writes happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] or [`AppError::Internal`] on database errors.
    async fn record(&self, new_access: NewUrlAccess) -> Result<UrlAccess, AppError>;
}
