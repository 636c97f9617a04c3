use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{JobId, JobMetadataId};

/// Free-form key/value annotation on a job, unique per (job, name).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobMetadata {
    pub id: JobMetadataId,
    pub job_id: JobId,
    pub name: String,
    pub value: String,
}

impl JobMetadata {
    /// Upsert one annotation; re-supplying a key overwrites its value
    /// instead of duplicating the entry.
    pub async fn upsert(
        job_id: JobId,
        name: &str,
        value: &str,
        db: impl sqlx::PgExecutor<'_>,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO job_metadata (id, job_id, name, value) VALUES ($1, $2, $3, $4)
            ON CONFLICT (job_id, name) DO UPDATE SET value = EXCLUDED.value
            RETURNING *
            "#,
        )
        .bind(JobMetadataId::new())
        .bind(job_id)
        .bind(name)
        .bind(value)
        .fetch_one(db)
        .await
        .map_err(Into::into)
    }

    pub async fn find_for_job(job_id: JobId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM job_metadata WHERE job_id = $1 ORDER BY name")
            .bind(job_id)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }
}
