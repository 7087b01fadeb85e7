//! PostgreSQL implementation of the access log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrlAccess, UrlAccess};
use crate::domain::repositories::AccessRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct AccessRow {
    id: i64,
    shortened_url_id: i64,
    ip_address: Option<String>,
    user_agent: Option<String>,
    accessed_at: DateTime<Utc>,
}

/// PostgreSQL repository for redirect accesses.
pub struct PgAccessRepository {
    pool: Arc<PgPool>,
}

impl PgAccessRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRepository for PgAccessRepository {
    async fn record(&self, new_access: NewUrlAccess) -> Result<UrlAccess, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AccessRow>(
            r#"
            INSERT INTO url_accesses (shortened_url_id, ip_address, user_agent)
            VALUES ($1, $2, $3)
            RETURNING id, shortened_url_id, ip_address, user_agent, accessed_at
            "#,
        )
        .bind(new_access.shortened_url_id)
        .bind(&new_access.ip_address)
        .bind(&new_access.user_agent)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE shortened_urls
            SET click_count = click_count + 1, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(new_access.shortened_url_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(UrlAccess {
            id: row.id,
            shortened_url_id: row.shortened_url_id,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            accessed_at: row.accessed_at,
        })
    }
}
