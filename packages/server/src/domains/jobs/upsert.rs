use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use super::models::{Company, Job, JobMetadata, JobSource, JobUpsert, Tag};

/// Provenance for one upsert: which feed produced the posting and the
/// feed's own identifier for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSourceInput {
    pub name: String,
    pub external_id: Option<String>,
    pub raw_url: Option<String>,
    pub data: Option<Value>,
}

/// Everything one feed item maps to: the job row plus its company,
/// tags, metadata and source record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobUpsertInput {
    pub title: String,
    pub company: Option<String>,
    pub author: Option<String>,
    pub location: Option<String>,
    pub url: String,
    pub posted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub description: Option<String>,
    pub is_remote: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub source: JobSourceInput,
}

/// Write one feed item into the canonical schema, atomically.
///
/// Steps run in one transaction: company find-or-create, job upsert by
/// URL, tag attach, metadata overwrite, source record. Running the same
/// input twice yields the same rows.
pub async fn upsert_job(input: &JobUpsertInput, pool: &PgPool) -> Result<Job> {
    let mut tx = pool.begin().await?;

    let company = match input.company.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => Some(Company::find_or_create(name, &mut *tx).await?),
        None => None,
    };

    let job = Job::upsert(
        &JobUpsert {
            title: &input.title,
            author: input.author.as_deref(),
            location: input.location.as_deref(),
            url: &input.url,
            description: input.description.as_deref(),
            is_remote: input.is_remote,
            posted_at: input.posted_at,
            company_id: company.map(|c| c.id),
        },
        &mut *tx,
    )
    .await?;

    for name in &input.tags {
        let tag = Tag::find_or_create(name, &mut *tx).await?;
        Tag::attach_to_job(job.id, tag.id, &mut *tx).await?;
    }

    for (name, value) in &input.metadata {
        JobMetadata::upsert(job.id, name, value, &mut *tx).await?;
    }

    // Feeds without a native id collapse onto the empty string so the
    // (source, external_id) key is always total.
    let external_id = input.source.external_id.clone().unwrap_or_default();
    JobSource::upsert(
        job.id,
        &input.source.name,
        &external_id,
        input.source.raw_url.as_deref(),
        input.source.data.clone(),
        &mut *tx,
    )
    .await?;

    tx.commit().await?;
    Ok(job)
}
