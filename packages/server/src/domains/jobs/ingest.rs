use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{error, info};

use super::ingestors::{reddit, web3career, RedditFeed, Web3CareerFeed};
use super::models::Job;
use crate::kernel::traits::{BaseJobStore, BaseNotifier};

/// The feeds the aggregator knows how to ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Reddit,
    Web3Career,
}

impl FromStr for Feed {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reddit" => Ok(Feed::Reddit),
            "web3career" => Ok(Feed::Web3Career),
            other => bail!("unknown feed: {}", other),
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::Reddit => write!(f, "reddit"),
            Feed::Web3Career => write!(f, "web3career"),
        }
    }
}

/// Outcome of one ingestion pass.
#[derive(Debug, Default, Serialize)]
pub struct IngestReport {
    /// Jobs stored this pass, in the order the feed produced them.
    pub created: Vec<Job>,
    /// Items the pass did not store because they already existed (or,
    /// for the early-stop policy, were never examined).
    pub skipped: usize,
}

/// Fetch the configured subreddits and store every post not already in
/// the database. A failing item never aborts the pass.
pub async fn run_reddit_ingestion(
    feed: &RedditFeed,
    subreddits: &[String],
    jobs: &dyn BaseJobStore,
    notifier: &dyn BaseNotifier,
) -> Result<IngestReport> {
    let posts = feed.fetch_posts(subreddits).await;
    ingest_reddit_posts(&posts, jobs, notifier).await
}

pub async fn ingest_reddit_posts(
    posts: &[reddit::RedditPost],
    jobs: &dyn BaseJobStore,
    notifier: &dyn BaseNotifier,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for post in posts {
        match jobs.job_exists(&post.url).await {
            Ok(true) => {
                report.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                error!("Existence check failed for {}: {:?}", post.url, e);
                continue;
            }
        }

        let input = reddit::post_to_upsert_input(post);
        match jobs.upsert_job(&input).await {
            Ok(job) => {
                info!("Stored new job [{}] from /u/{}", job.title, post.author);
                if let Err(e) = notifier.send_to_all(&reddit::notification_payload(post)).await {
                    error!("Notification fan-out failed for {}: {:?}", post.url, e);
                }
                report.created.push(job);
            }
            Err(e) => {
                error!("Failed to store {}: {:?}", post.url, e);
            }
        }
    }

    info!(
        "Reddit ingestion finished: {} created, {} skipped",
        report.created.len(),
        report.skipped
    );
    Ok(report)
}

/// Fetch the Web3 Career listings and store them newest-first until the
/// first already-known listing, then stop. Everything past that point
/// was seen on an earlier pass.
pub async fn run_web3career_ingestion(
    feed: &Web3CareerFeed,
    jobs: &dyn BaseJobStore,
    notifier: &dyn BaseNotifier,
) -> Result<IngestReport> {
    let listings = feed.fetch_jobs().await?;
    ingest_web3career_jobs(&listings, jobs, notifier).await
}

pub async fn ingest_web3career_jobs(
    listings: &[web3career::Web3CareerJob],
    jobs: &dyn BaseJobStore,
    notifier: &dyn BaseNotifier,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    let mut processed = 0usize;

    for listing in listings {
        match jobs.job_exists(&listing.apply_url).await {
            Ok(true) => {
                info!(
                    "Reached known listing {}, stopping this pass",
                    listing.apply_url
                );
                break;
            }
            Ok(false) => {}
            Err(e) => {
                error!(
                    "Existence check failed for {}: {:?}",
                    listing.apply_url, e
                );
                processed += 1;
                continue;
            }
        }
        processed += 1;

        let input = web3career::job_to_upsert_input(listing);
        match jobs.upsert_job(&input).await {
            Ok(job) => {
                info!("Stored new job [{}]", job.title);
                if let Err(e) = notifier
                    .send_to_all(&web3career::notification_payload(listing))
                    .await
                {
                    error!(
                        "Notification fan-out failed for {}: {:?}",
                        listing.apply_url, e
                    );
                }
                report.created.push(job);
            }
            Err(e) => {
                error!("Failed to store {}: {:?}", listing.apply_url, e);
            }
        }
    }

    report.skipped = listings.len() - processed;
    info!(
        "Web3 Career ingestion finished: {} created, {} skipped",
        report.created.len(),
        report.skipped
    );
    Ok(report)
}
