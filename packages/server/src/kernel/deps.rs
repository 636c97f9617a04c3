use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;

use super::traits::{
    BaseFcmService, BaseJobStore, BaseSubscriptionStore, BaseWebPushService, PushError,
};
use super::webpush::WebPushService;
use crate::common::SubscriptionId;
use crate::config::Config;
use crate::domains::jobs::ingest::{
    run_reddit_ingestion, run_web3career_ingestion, Feed, IngestReport,
};
use crate::domains::jobs::ingestors::{RedditFeed, Web3CareerFeed};
use crate::domains::jobs::models::Job;
use crate::domains::jobs::upsert::{self, JobUpsertInput};
use crate::domains::notifications::fanout::Notifier;
use crate::domains::notifications::models::{NotificationPayload, Subscription};

/// Job persistence backed by Postgres.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseJobStore for PgJobStore {
    async fn job_exists(&self, url: &str) -> Result<bool> {
        Job::exists_by_url(url, &self.pool).await
    }

    async fn upsert_job(&self, input: &JobUpsertInput) -> Result<Job> {
        upsert::upsert_job(input, &self.pool).await
    }
}

/// Subscription persistence backed by Postgres.
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseSubscriptionStore for PgSubscriptionStore {
    async fn list(&self) -> Result<Vec<Subscription>> {
        Subscription::find_all(&self.pool).await
    }

    async fn remove(&self, id: SubscriptionId) -> Result<()> {
        Subscription::delete(id, &self.pool).await
    }
}

/// Adapter from the FCM client to the delivery trait.
pub struct FcmAdapter(pub Arc<fcm::FcmService>);

#[async_trait]
impl BaseFcmService for FcmAdapter {
    async fn deliver(&self, token: &str, payload: &NotificationPayload) -> Result<(), PushError> {
        let data = json!({ "url": payload.url });
        self.0
            .send(token, &payload.title, &payload.body, Some(data))
            .await
            .map_err(|e| match e {
                fcm::FcmError::InvalidToken => PushError::InvalidToken,
                fcm::FcmError::Response(detail) => PushError::Provider(detail),
                fcm::FcmError::Request(detail) => PushError::Transport(detail),
            })
    }
}

/// Shared dependency container wired once at startup.
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub jobs: Arc<dyn BaseJobStore>,
    pub subscriptions: Arc<dyn BaseSubscriptionStore>,
    pub notifier: Arc<Notifier>,
    pub reddit: Arc<RedditFeed>,
    pub web3career: Arc<Web3CareerFeed>,
    pub reddit_subreddits: Vec<String>,
}

impl ServerDeps {
    pub fn new(db_pool: PgPool, config: &Config) -> Result<Self> {
        let jobs: Arc<dyn BaseJobStore> = Arc::new(PgJobStore::new(db_pool.clone()));
        let subscriptions: Arc<dyn BaseSubscriptionStore> =
            Arc::new(PgSubscriptionStore::new(db_pool.clone()));

        let web_push: Arc<dyn BaseWebPushService> = Arc::new(WebPushService::new(
            config.vapid_private_pem.clone(),
            config.vapid_subject.clone(),
        )?);
        let fcm: Arc<dyn BaseFcmService> = Arc::new(FcmAdapter(Arc::new(fcm::FcmService::new(
            fcm::FcmOptions {
                server_key: config.fcm_server_key.clone(),
            },
        ))));

        let notifier = Arc::new(Notifier::new(subscriptions.clone(), web_push, fcm));

        Ok(Self {
            db_pool,
            jobs,
            subscriptions,
            notifier,
            reddit: Arc::new(RedditFeed::new()),
            web3career: Arc::new(Web3CareerFeed::new(config.web3career_api_token.clone())),
            reddit_subreddits: config.reddit_subreddits.clone(),
        })
    }

    /// Run one ingestion pass for the given feed.
    pub async fn run_ingestion(&self, feed: Feed) -> Result<IngestReport> {
        match feed {
            Feed::Reddit => {
                run_reddit_ingestion(
                    &self.reddit,
                    &self.reddit_subreddits,
                    self.jobs.as_ref(),
                    self.notifier.as_ref(),
                )
                .await
            }
            Feed::Web3Career => {
                run_web3career_ingestion(
                    &self.web3career,
                    self.jobs.as_ref(),
                    self.notifier.as_ref(),
                )
                .await
            }
        }
    }
}
