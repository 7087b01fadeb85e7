//! Short link creation, resolution and owner-scoped management.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::application::services::code_resolver::{CodeResolver, DEFAULT_MAX_ATTEMPTS};
use crate::domain::entities::{NewShortenedUrl, ShortenResult, ShortenedUrl};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;

/// Service for shortening URLs and managing an owner's links.
///
/// Authenticated submissions are deduplicated per owner: resubmitting the same
/// URL returns the owner's existing live link. Anonymous submissions always
/// create a new link.
pub struct ShortenerService<L: UrlRepository + ?Sized> {
    repository: Arc<L>,
    resolver: CodeResolver<L>,
    base_url: String,
}

impl<L: UrlRepository + ?Sized> ShortenerService<L> {
    /// Creates a new service.
    ///
    /// # Arguments
    ///
    /// - `repository` - link storage
    /// - `generator` - source of candidate codes
    /// - `base_url` - public origin prepended to codes, e.g. `http://localhost:3000`
    pub fn new(repository: Arc<L>, generator: Arc<dyn CodeGenerator>, base_url: String) -> Self {
        let resolver = CodeResolver::new(repository.clone(), generator, DEFAULT_MAX_ATTEMPTS);
        Self {
            repository,
            resolver,
            base_url,
        }
    }

    /// Replaces the attempt budget shared by the code lookup and insert retries.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.resolver = self.resolver.with_max_attempts(max_attempts);
        self
    }

    /// Shortens `original_url`, optionally on behalf of `owner_id`.
    ///
    /// # Deduplication
    ///
    /// With an owner, an existing live link for the exact same URL is returned
    /// unchanged and nothing is written.
    ///
    /// # Races
    ///
    /// The unused-code lookup and the insert are separate steps. If another
    /// request claims the code in between, the insert is rejected and a fresh
    /// code is resolved, within the same attempt budget.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors or when no free code
    /// could be claimed.
    pub async fn shorten(
        &self,
        original_url: &str,
        owner_id: Option<i64>,
    ) -> Result<ShortenResult, AppError> {
        if let Some(owner_id) = owner_id
            && let Some(existing) = self
                .repository
                .find_live_by_owner_and_url(owner_id, original_url)
                .await?
        {
            return Ok(self.to_result(existing, false));
        }

        let mut remaining = self.resolver.max_attempts();
        loop {
            let short_code = self.resolver.resolve_within(&mut remaining).await?;

            let new_url = NewShortenedUrl {
                original_url: original_url.to_string(),
                short_code: short_code.clone(),
                owner_id,
            };

            match self.repository.try_create(new_url).await? {
                Some(created) => {
                    metrics::counter!("linkshort_links_created_total").increment(1);
                    info!(
                        id = created.id,
                        code = %created.short_code,
                        owner_id = ?created.owner_id,
                        "Short link created"
                    );
                    return Ok(self.to_result(created, true));
                }
                None => {
                    warn!(remaining, code = %short_code, "Short code claimed concurrently, retrying");
                }
            }
        }
    }

    /// Looks up the live link for a short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown and soft-deleted codes.
    pub async fn resolve(&self, code: &str) -> Result<ShortenedUrl, AppError> {
        self.repository
            .find_live_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("URL not found", json!({ "code": code })))
    }

    /// Returns one page of the owner's live links, newest first.
    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ShortenedUrl>, AppError> {
        self.repository
            .list_live_by_owner(owner_id, offset, limit)
            .await
    }

    pub async fn count_for_owner(&self, owner_id: i64) -> Result<i64, AppError> {
        self.repository.count_live_by_owner(owner_id).await
    }

    /// Changes the destination of one of the owner's live links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist, belongs to
    /// someone else, or is deleted.
    pub async fn update_for_owner(
        &self,
        id: i64,
        owner_id: i64,
        original_url: &str,
    ) -> Result<ShortenedUrl, AppError> {
        self.repository
            .update_original_url(id, owner_id, original_url)
            .await?
            .ok_or_else(|| AppError::not_found("URL not found", json!({ "id": id })))
    }

    /// Soft-deletes one of the owner's live links.
    ///
    /// The code stays reserved and stops redirecting.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_for_owner`]; deleting twice yields NotFound.
    pub async fn delete_for_owner(&self, id: i64, owner_id: i64) -> Result<ShortenedUrl, AppError> {
        let deleted = self
            .repository
            .soft_delete(id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("URL not found", json!({ "id": id })))?;

        info!(id, code = %deleted.short_code, "Short link deleted");
        Ok(deleted)
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    /// Verifies storage connectivity.
    pub async fn check_storage(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    fn to_result(&self, url: ShortenedUrl, created: bool) -> ShortenResult {
        ShortenResult {
            short_url: self.short_url(&url.short_code),
            original_url: url.original_url,
            short_code: url.short_code,
            created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::utils::code_generator::{MockCodeGenerator, RandomCodeGenerator};
    use chrono::Utc;
    use mockall::Sequence;

    const BASE_URL: &str = "http://localhost:3000";

    fn create_test_url(id: i64, code: &str, url: &str, owner_id: Option<i64>) -> ShortenedUrl {
        let now = Utc::now();
        ShortenedUrl {
            id,
            original_url: url.to_string(),
            short_code: code.to_string(),
            owner_id,
            click_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn fixed_generator(code: &'static str) -> Arc<MockCodeGenerator> {
        let mut generator = MockCodeGenerator::new();
        generator
            .expect_generate()
            .returning(move || code.to_string());
        Arc::new(generator)
    }

    #[tokio::test]
    async fn test_shorten_anonymous_creates_link() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo.expect_find_live_by_owner_and_url().times(0);
        mock_repo
            .expect_code_exists()
            .times(1)
            .returning(|_| Ok(false));
        mock_repo
            .expect_try_create()
            .withf(|new_url| {
                new_url.owner_id.is_none()
                    && new_url.short_code == "Ab3dE9"
                    && new_url.original_url == "https://example.com"
            })
            .times(1)
            .returning(|new_url| {
                Ok(Some(create_test_url(
                    1,
                    &new_url.short_code,
                    &new_url.original_url,
                    None,
                )))
            });

        let service = ShortenerService::new(
            Arc::new(mock_repo),
            fixed_generator("Ab3dE9"),
            BASE_URL.to_string(),
        );

        let result = service.shorten("https://example.com", None).await.unwrap();

        assert_eq!(result.short_code, "Ab3dE9");
        assert_eq!(result.short_url, "http://localhost:3000/Ab3dE9");
        assert_eq!(result.original_url, "https://example.com");
        assert!(result.created);
    }

    #[tokio::test]
    async fn test_shorten_owner_deduplicates() {
        let mut mock_repo = MockUrlRepository::new();

        let existing = create_test_url(5, "Exist1", "https://example.com", Some(7));
        mock_repo
            .expect_find_live_by_owner_and_url()
            .withf(|owner, url| *owner == 7 && url == "https://example.com")
            .times(1)
            .returning(move |_, _| Ok(Some(existing.clone())));
        mock_repo.expect_code_exists().times(0);
        mock_repo.expect_try_create().times(0);

        let service = ShortenerService::new(
            Arc::new(mock_repo),
            Arc::new(MockCodeGenerator::new()),
            BASE_URL.to_string(),
        );

        let result = service
            .shorten("https://example.com", Some(7))
            .await
            .unwrap();

        assert_eq!(result.short_code, "Exist1");
        assert!(!result.created);
    }

    #[tokio::test]
    async fn test_shorten_owner_without_existing_link_creates_owned_row() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo
            .expect_find_live_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        mock_repo
            .expect_code_exists()
            .times(1)
            .returning(|_| Ok(false));
        mock_repo
            .expect_try_create()
            .withf(|new_url| new_url.owner_id == Some(7))
            .times(1)
            .returning(|new_url| {
                Ok(Some(create_test_url(
                    2,
                    &new_url.short_code,
                    &new_url.original_url,
                    new_url.owner_id,
                )))
            });

        let service = ShortenerService::new(
            Arc::new(mock_repo),
            fixed_generator("Xyz789"),
            BASE_URL.to_string(),
        );

        let result = service
            .shorten("https://example.com", Some(7))
            .await
            .unwrap();
        assert!(result.created);
        assert_eq!(result.short_code, "Xyz789");
    }

    #[tokio::test]
    async fn test_shorten_retries_after_insert_conflict() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo.expect_code_exists().returning(|_| Ok(false));

        let mut seq = Sequence::new();
        mock_repo
            .expect_try_create()
            .withf(|new_url| new_url.short_code == "AAAAAA")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        mock_repo
            .expect_try_create()
            .withf(|new_url| new_url.short_code == "BBBBBB")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_url| {
                Ok(Some(create_test_url(
                    3,
                    &new_url.short_code,
                    &new_url.original_url,
                    None,
                )))
            });

        let mut generator = MockCodeGenerator::new();
        let mut gen_seq = Sequence::new();
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut gen_seq)
            .returning(|| "AAAAAA".to_string());
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut gen_seq)
            .returning(|| "BBBBBB".to_string());

        let service = ShortenerService::new(
            Arc::new(mock_repo),
            Arc::new(generator),
            BASE_URL.to_string(),
        );

        let result = service.shorten("https://example.com", None).await.unwrap();
        assert_eq!(result.short_code, "BBBBBB");
    }

    #[tokio::test]
    async fn test_shorten_gives_up_after_repeated_conflicts() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo.expect_code_exists().returning(|_| Ok(false));
        mock_repo
            .expect_try_create()
            .times(2)
            .returning(|_| Ok(None));

        let service = ShortenerService::new(
            Arc::new(mock_repo),
            Arc::new(RandomCodeGenerator::seeded(9)),
            BASE_URL.to_string(),
        )
        .with_max_attempts(2);

        let err = service
            .shorten("https://example.com", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_shorten_conflicts_and_lookups_share_one_budget() {
        let mut mock_repo = MockUrlRepository::new();
        let mut seq = Sequence::new();
        mock_repo
            .expect_code_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock_repo
            .expect_code_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        mock_repo
            .expect_try_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        mock_repo
            .expect_code_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        mock_repo
            .expect_try_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));

        let mut generator = MockCodeGenerator::new();
        generator
            .expect_generate()
            .times(3)
            .returning(|| "AAAAAA".to_string());

        let service = ShortenerService::new(
            Arc::new(mock_repo),
            Arc::new(generator),
            BASE_URL.to_string(),
        )
        .with_max_attempts(3);

        let err = service
            .shorten("https://example.com", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate unique short code");
    }

    #[tokio::test]
    async fn test_shorten_propagates_storage_error() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_find_live_by_owner_and_url()
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let service = ShortenerService::new(
            Arc::new(mock_repo),
            Arc::new(MockCodeGenerator::new()),
            BASE_URL.to_string(),
        );

        let err = service
            .shorten("https://example.com", Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_find_live_by_code()
            .withf(|code| code == "Gone12")
            .returning(|_| Ok(None));

        let service = ShortenerService::new(
            Arc::new(mock_repo),
            Arc::new(MockCodeGenerator::new()),
            BASE_URL.to_string(),
        );

        let err = service.resolve("Gone12").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_for_owner_not_found() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_update_original_url()
            .withf(|id, owner, url| *id == 3 && *owner == 8 && url == "https://new.example.com")
            .returning(|_, _, _| Ok(None));

        let service = ShortenerService::new(
            Arc::new(mock_repo),
            Arc::new(MockCodeGenerator::new()),
            BASE_URL.to_string(),
        );

        let err = service
            .update_for_owner(3, 8, "https://new.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_for_owner_success() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo.expect_soft_delete().returning(|id, owner| {
            let mut url = create_test_url(id, "Ab3dE9", "https://example.com", Some(owner));
            url.deleted_at = Some(Utc::now());
            Ok(Some(url))
        });

        let service = ShortenerService::new(
            Arc::new(mock_repo),
            Arc::new(MockCodeGenerator::new()),
            BASE_URL.to_string(),
        );

        let deleted = service.delete_for_owner(4, 7).await.unwrap();
        assert!(deleted.is_deleted());
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let service = ShortenerService::new(
            Arc::new(MockUrlRepository::new()),
            Arc::new(MockCodeGenerator::new()),
            "https://sho.rt/".to_string(),
        );

        assert_eq!(service.short_url("Ab3dE9"), "https://sho.rt/Ab3dE9");
    }
}
