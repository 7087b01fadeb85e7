//! PostgreSQL implementation of the short link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortenedUrl, ShortenedUrl};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct UrlRow {
    id: i64,
    original_url: String,
    short_code: String,
    owner_id: Option<i64>,
    click_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<UrlRow> for ShortenedUrl {
    fn from(r: UrlRow) -> Self {
        ShortenedUrl {
            id: r.id,
            original_url: r.original_url,
            short_code: r.short_code,
            owner_id: r.owner_id,
            click_count: r.click_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted_at: r.deleted_at,
        }
    }
}

/// PostgreSQL repository for short links.
///
/// Every lookup except [`UrlRepository::code_exists`] only sees live rows
/// (`deleted_at IS NULL`).
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn find_live_by_owner_and_url(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<ShortenedUrl>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, original_url, short_code, owner_id, click_count,
                   created_at, updated_at, deleted_at
            FROM shortened_urls
            WHERE owner_id = $1
              AND md5(original_url) = md5($2)
              AND original_url = $2
              AND deleted_at IS NULL
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM shortened_urls WHERE short_code = $1)",
        )
        .bind(code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn try_create(
        &self,
        new_url: NewShortenedUrl,
    ) -> Result<Option<ShortenedUrl>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO shortened_urls (original_url, short_code, owner_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (short_code) DO NOTHING
            RETURNING id, original_url, short_code, owner_id, click_count,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(&new_url.original_url)
        .bind(&new_url.short_code)
        .bind(new_url.owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_live_by_code(&self, code: &str) -> Result<Option<ShortenedUrl>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, original_url, short_code, owner_id, click_count,
                   created_at, updated_at, deleted_at
            FROM shortened_urls
            WHERE short_code = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_live_by_owner(
        &self,
        owner_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ShortenedUrl>, AppError> {
        let rows = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, original_url, short_code, owner_id, click_count,
                   created_at, updated_at, deleted_at
            FROM shortened_urls
            WHERE owner_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_live_by_owner(&self, owner_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM shortened_urls WHERE owner_id = $1 AND deleted_at IS NULL",
        )
        .bind(owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update_original_url(
        &self,
        id: i64,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<ShortenedUrl>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            UPDATE shortened_urls
            SET original_url = $3, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            RETURNING id, original_url, short_code, owner_id, click_count,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> Result<Option<ShortenedUrl>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            UPDATE shortened_urls
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            RETURNING id, original_url, short_code, owner_id, click_count,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
