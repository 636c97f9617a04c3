use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use super::deps::ServerDeps;
use crate::domains::jobs::ingest::Feed;

// Reddit every 30 minutes, Web3 Career on the hour. Both feeds are
// idempotent, so an overlapping run only wastes requests.
const REDDIT_SCHEDULE: &str = "0 */30 * * * *";
const WEB3CAREER_SCHEDULE: &str = "0 0 * * * *";

pub async fn start_scheduler(deps: ServerDeps) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let reddit_deps = deps.clone();
    scheduler
        .add(Job::new_async(REDDIT_SCHEDULE, move |_uuid, _lock| {
            let deps = reddit_deps.clone();
            Box::pin(async move {
                run_feed(&deps, Feed::Reddit).await;
            })
        })?)
        .await?;

    let web3_deps = deps.clone();
    scheduler
        .add(Job::new_async(WEB3CAREER_SCHEDULE, move |_uuid, _lock| {
            let deps = web3_deps.clone();
            Box::pin(async move {
                run_feed(&deps, Feed::Web3Career).await;
            })
        })?)
        .await?;

    scheduler.start().await?;
    info!("Scheduler started: reddit every 30 minutes, web3career hourly");
    Ok(scheduler)
}

async fn run_feed(deps: &ServerDeps, feed: Feed) {
    info!("Scheduled ingestion starting for {}", feed);
    match deps.run_ingestion(feed).await {
        Ok(report) => info!(
            "Scheduled ingestion for {} done: {} created, {} skipped",
            feed,
            report.created.len(),
            report.skipped
        ),
        Err(e) => error!("Scheduled ingestion for {} failed: {:?}", feed, e),
    }
}
