use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{JobId, TagId};

/// A tag shared across jobs. Names are opaque, case-sensitive strings
/// exactly as the feeds provide them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Find-or-create by unique name; an ingestion that reuses a tag
    /// name reuses the existing row.
    pub async fn find_or_create(name: &str, db: impl sqlx::PgExecutor<'_>) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO tags (id, name) VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(TagId::new())
        .bind(name)
        .fetch_one(db)
        .await
        .map_err(Into::into)
    }

    /// Associate a tag with a job; no-op when the pair already exists.
    pub async fn attach_to_job(
        job_id: JobId,
        tag_id: TagId,
        db: impl sqlx::PgExecutor<'_>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO job_tags (job_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(job_id)
        .bind(tag_id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn find_for_job(job_id: JobId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT t.* FROM tags t
            JOIN job_tags jt ON jt.tag_id = t.id
            WHERE jt.job_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(job_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
