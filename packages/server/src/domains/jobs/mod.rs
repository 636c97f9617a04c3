//! Job aggregation domain: canonical job model, feed ingestors, the
//! upsert engine, and the ingestion orchestrator.

pub mod ingest;
pub mod ingestors;
pub mod models;
pub mod upsert;

pub use ingest::{Feed, IngestReport};
pub use upsert::{upsert_job, JobSourceInput, JobUpsertInput};
