use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::CompanyId;

/// A hiring company, created lazily the first time a job references an
/// unseen name. Never deleted by the ingestion core.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub async fn find_by_name(name: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM companies WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find-or-create by unique name. The no-op update makes the
    /// statement return the existing row on conflict.
    pub async fn find_or_create(name: &str, db: impl sqlx::PgExecutor<'_>) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO companies (id, name) VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(CompanyId::new())
        .bind(name)
        .fetch_one(db)
        .await
        .map_err(Into::into)
    }
}
