use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::common::{JobId, JobSourceId};

/// Provenance record: which feed a job came from, with the raw payload
/// kept for audit and debugging. Unique per (source, external_id).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobSource {
    pub id: JobSourceId,
    pub source: String,
    pub external_id: String,
    pub raw_url: Option<String>,
    pub data: Option<Value>,
    pub job_id: JobId,
    pub created_at: DateTime<Utc>,
}

impl JobSource {
    /// Upsert keyed by (source, external_id). Re-ingesting the same
    /// external id refreshes the raw payload and re-points `job_id` at
    /// the given job, even if that job differs from the previous one.
    pub async fn upsert(
        job_id: JobId,
        source: &str,
        external_id: &str,
        raw_url: Option<&str>,
        data: Option<Value>,
        db: impl sqlx::PgExecutor<'_>,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO job_sources (id, source, external_id, raw_url, data, job_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source, external_id) DO UPDATE SET
                raw_url = EXCLUDED.raw_url,
                data = EXCLUDED.data,
                job_id = EXCLUDED.job_id
            RETURNING *
            "#,
        )
        .bind(JobSourceId::new())
        .bind(source)
        .bind(external_id)
        .bind(raw_url)
        .bind(data)
        .bind(job_id)
        .fetch_one(db)
        .await
        .map_err(Into::into)
    }

    pub async fn find_for_job(job_id: JobId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM job_sources WHERE job_id = $1 ORDER BY created_at")
            .bind(job_id)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }
}
