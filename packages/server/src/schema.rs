//! Database schema bootstrap.
//!
//! Every statement is idempotent, so running this against an existing
//! database is safe.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT,
            location TEXT,
            url TEXT NOT NULL UNIQUE,
            description TEXT,
            is_remote BOOLEAN,
            posted_at TIMESTAMPTZ,
            company_id UUID REFERENCES companies(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_company_id ON jobs(company_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_tags (
            job_id UUID NOT NULL REFERENCES jobs(id),
            tag_id UUID NOT NULL REFERENCES tags(id),
            PRIMARY KEY (job_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_metadata (
            id UUID PRIMARY KEY,
            job_id UUID NOT NULL REFERENCES jobs(id),
            name TEXT NOT NULL,
            value TEXT NOT NULL,
            UNIQUE (job_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_sources (
            id UUID PRIMARY KEY,
            source TEXT NOT NULL,
            external_id TEXT NOT NULL,
            raw_url TEXT,
            data JSONB,
            job_id UUID NOT NULL REFERENCES jobs(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (source, external_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_job_sources_job_id ON job_sources(job_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            id UUID PRIMARY KEY,
            endpoint TEXT NOT NULL,
            kind TEXT NOT NULL,
            keys JSONB NOT NULL,
            ip_address TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (endpoint, kind)
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Schema migrations applied");
    Ok(())
}
