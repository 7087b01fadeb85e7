//! Unused short code lookup.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, is_reserved_code};

/// Default number of candidates tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Draws candidate codes until storage reports one as unused.
///
/// A code counts as used while any row carries it, soft-deleted rows included,
/// so a deleted link's code is never handed out again. Codes shadowed by fixed
/// routes are skipped without a lookup.
pub struct CodeResolver<L: UrlRepository + ?Sized> {
    repository: Arc<L>,
    generator: Arc<dyn CodeGenerator>,
    max_attempts: usize,
}

impl<L: UrlRepository + ?Sized> CodeResolver<L> {
    pub fn new(repository: Arc<L>, generator: Arc<dyn CodeGenerator>, max_attempts: usize) -> Self {
        Self {
            repository,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns the first generated code not present in storage.
    ///
    /// The check is not atomic with the later insert; callers must handle a
    /// rejected insert.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] after `max_attempts` taken candidates, or
    /// the storage error as soon as a lookup fails.
    pub async fn resolve(&self) -> Result<String, AppError> {
        let mut remaining = self.max_attempts;
        self.resolve_within(&mut remaining).await
    }

    /// Like [`Self::resolve`], drawing candidates from a caller-held budget.
    ///
    /// Every generated candidate consumes one unit, whether it turns out taken,
    /// reserved or free. Callers that retry a rejected insert pass the same
    /// budget again, so lookups and retries together never exceed it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] once the budget is spent, or the storage
    /// error as soon as a lookup fails.
    pub async fn resolve_within(&self, remaining: &mut usize) -> Result<String, AppError> {
        while *remaining > 0 {
            *remaining -= 1;
            let attempt = self.max_attempts.saturating_sub(*remaining);
            let code = self.generator.generate();

            if is_reserved_code(&code) {
                debug!(attempt, code = %code, "Skipping reserved short code");
                continue;
            }

            if !self.repository.code_exists(&code).await? {
                return Ok(code);
            }

            debug!(attempt, code = %code, "Short code already taken");
        }

        Err(AppError::internal(
            "Failed to generate unique short code",
            json!({ "attempts": self.max_attempts }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::utils::code_generator::MockCodeGenerator;
    use mockall::Sequence;

    fn generator_yielding(codes: &[&'static str]) -> MockCodeGenerator {
        let mut generator = MockCodeGenerator::new();
        let mut seq = Sequence::new();
        for &code in codes {
            generator
                .expect_generate()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move || code.to_string());
        }
        generator
    }

    #[tokio::test]
    async fn test_resolve_first_candidate_free() {
        let mut repo = MockUrlRepository::new();
        repo.expect_code_exists()
            .withf(|code| code == "Ab3dE9")
            .times(1)
            .returning(|_| Ok(false));

        let resolver = CodeResolver::new(
            Arc::new(repo),
            Arc::new(generator_yielding(&["Ab3dE9"])),
            DEFAULT_MAX_ATTEMPTS,
        );

        assert_eq!(resolver.resolve().await.unwrap(), "Ab3dE9");
    }

    #[tokio::test]
    async fn test_resolve_skips_taken_code() {
        let mut repo = MockUrlRepository::new();
        repo.expect_code_exists()
            .withf(|code| code == "AAAAAA")
            .times(1)
            .returning(|_| Ok(true));
        repo.expect_code_exists()
            .withf(|code| code == "BBBBBB")
            .times(1)
            .returning(|_| Ok(false));

        let resolver = CodeResolver::new(
            Arc::new(repo),
            Arc::new(generator_yielding(&["AAAAAA", "BBBBBB"])),
            DEFAULT_MAX_ATTEMPTS,
        );

        assert_eq!(resolver.resolve().await.unwrap(), "BBBBBB");
    }

    #[tokio::test]
    async fn test_resolve_skips_reserved_code() {
        let mut repo = MockUrlRepository::new();
        repo.expect_code_exists()
            .withf(|code| code == "Ab3dE9")
            .times(1)
            .returning(|_| Ok(false));

        let resolver = CodeResolver::new(
            Arc::new(repo),
            Arc::new(generator_yielding(&["health", "Ab3dE9"])),
            DEFAULT_MAX_ATTEMPTS,
        );

        assert_eq!(resolver.resolve().await.unwrap(), "Ab3dE9");
    }

    #[tokio::test]
    async fn test_resolve_gives_up_after_max_attempts() {
        let mut repo = MockUrlRepository::new();
        repo.expect_code_exists().times(3).returning(|_| Ok(true));

        let mut generator = MockCodeGenerator::new();
        generator
            .expect_generate()
            .times(3)
            .returning(|| "AAAAAA".to_string());

        let resolver = CodeResolver::new(Arc::new(repo), Arc::new(generator), 3);

        let err = resolver.resolve().await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
        assert_eq!(err.to_string(), "Failed to generate unique short code");
    }

    #[tokio::test]
    async fn test_resolve_propagates_storage_error() {
        let mut repo = MockUrlRepository::new();
        repo.expect_code_exists()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let resolver = CodeResolver::new(
            Arc::new(repo),
            Arc::new(generator_yielding(&["Ab3dE9"])),
            DEFAULT_MAX_ATTEMPTS,
        );

        let err = resolver.resolve().await.unwrap_err();
        assert_eq!(err.to_string(), "Database error");
    }

    #[tokio::test]
    async fn test_resolve_within_consumes_shared_budget() {
        let mut repo = MockUrlRepository::new();
        repo.expect_code_exists()
            .withf(|code| code == "AAAAAA")
            .times(1)
            .returning(|_| Ok(true));
        repo.expect_code_exists()
            .withf(|code| code == "BBBBBB")
            .times(1)
            .returning(|_| Ok(false));

        let resolver = CodeResolver::new(
            Arc::new(repo),
            Arc::new(generator_yielding(&["AAAAAA", "BBBBBB"])),
            3,
        );

        let mut remaining = 3;
        assert_eq!(resolver.resolve_within(&mut remaining).await.unwrap(), "BBBBBB");
        assert_eq!(remaining, 1);
    }

    #[tokio::test]
    async fn test_resolve_within_empty_budget_fails_without_lookup() {
        let mut repo = MockUrlRepository::new();
        repo.expect_code_exists().times(0);
        let mut generator = MockCodeGenerator::new();
        generator.expect_generate().times(0);

        let resolver = CodeResolver::new(Arc::new(repo), Arc::new(generator), 3);

        let mut remaining = 0;
        let err = resolver.resolve_within(&mut remaining).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let resolver = CodeResolver::new(
            Arc::new(MockUrlRepository::new()),
            Arc::new(MockCodeGenerator::new()),
            0,
        );
        assert_eq!(resolver.max_attempts(), 1);
    }
}
