use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CompanyId, JobId};

/// A job posting, deduplicated by its canonical URL.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub author: Option<String>,
    pub location: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub is_remote: Option<bool>,
    pub posted_at: Option<DateTime<Utc>>,
    pub company_id: Option<CompanyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for one job upsert. On conflict, `None` options leave
/// the stored value untouched; present values overwrite it.
#[derive(Debug)]
pub struct JobUpsert<'a> {
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub location: Option<&'a str>,
    pub url: &'a str,
    pub description: Option<&'a str>,
    pub is_remote: Option<bool>,
    pub posted_at: Option<DateTime<Utc>>,
    pub company_id: Option<CompanyId>,
}

impl Job {
    pub async fn find_by_id(id: JobId, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_url(url: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM jobs WHERE url = $1")
            .bind(url)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Existence check by canonical URL; the dedup probe used by both
    /// ingestion policies.
    pub async fn exists_by_url(url: &str, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM jobs WHERE url = $1)")
            .bind(url)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_recent(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM jobs ORDER BY created_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert or update the job row keyed by canonical URL.
    pub async fn upsert(row: &JobUpsert<'_>, db: impl sqlx::PgExecutor<'_>) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO jobs (id, title, author, location, url, description, is_remote, posted_at, company_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (url) DO UPDATE SET
                title = EXCLUDED.title,
                author = COALESCE(EXCLUDED.author, jobs.author),
                location = COALESCE(EXCLUDED.location, jobs.location),
                description = COALESCE(EXCLUDED.description, jobs.description),
                is_remote = COALESCE(EXCLUDED.is_remote, jobs.is_remote),
                posted_at = COALESCE(EXCLUDED.posted_at, jobs.posted_at),
                company_id = COALESCE(EXCLUDED.company_id, jobs.company_id),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(JobId::new())
        .bind(row.title)
        .bind(row.author)
        .bind(row.location)
        .bind(row.url)
        .bind(row.description)
        .bind(row.is_remote)
        .bind(row.posted_at)
        .bind(row.company_id)
        .fetch_one(db)
        .await
        .map_err(Into::into)
    }

    /// Delete a job and its associations.
    pub async fn delete(id: JobId, pool: &PgPool) -> Result<()> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM job_tags WHERE job_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM job_metadata WHERE job_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM job_sources WHERE job_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
