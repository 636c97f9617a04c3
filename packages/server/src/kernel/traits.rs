// Trait definitions for dependency injection
// These are INFRASTRUCTURE traits only - no business logic

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::common::SubscriptionId;
use crate::domains::jobs::models::Job;
use crate::domains::jobs::upsert::JobUpsertInput;
use crate::domains::notifications::fanout::FanoutReport;
use crate::domains::notifications::models::{NotificationPayload, Subscription};

/// How a push delivery failed, as far as classification needs to know.
#[derive(Debug, Error)]
pub enum PushError {
    /// The push service says this endpoint no longer exists.
    #[error("push endpoint is gone")]
    EndpointGone,
    /// The provider says this device token will never work again.
    #[error("device token is invalid")]
    InvalidToken,
    /// The provider rejected the delivery for some other reason.
    #[error("provider error: {0}")]
    Provider(String),
    /// The request never got a provider verdict.
    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait BaseJobStore: Send + Sync {
    async fn job_exists(&self, url: &str) -> Result<bool>;
    async fn upsert_job(&self, input: &JobUpsertInput) -> Result<Job>;
}

#[async_trait]
pub trait BaseSubscriptionStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Subscription>>;
    async fn remove(&self, id: SubscriptionId) -> Result<()>;
}

#[async_trait]
pub trait BaseWebPushService: Send + Sync {
    async fn deliver(
        &self,
        endpoint: &str,
        p256dh: &str,
        auth: &str,
        payload: &[u8],
    ) -> Result<(), PushError>;
}

#[async_trait]
pub trait BaseFcmService: Send + Sync {
    async fn deliver(&self, token: &str, payload: &NotificationPayload) -> Result<(), PushError>;
}

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    async fn send_to_all(&self, payload: &NotificationPayload) -> Result<FanoutReport>;
}
