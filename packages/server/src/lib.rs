// Job Feed Aggregator - API Core
//
// This crate ingests job postings from external feeds (Reddit, Web3
// Career), dedupes them into a canonical Postgres schema, and fans out
// push notifications to Web Push and FCM subscribers whenever a new
// posting is stored.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod schema;

pub use config::*;
