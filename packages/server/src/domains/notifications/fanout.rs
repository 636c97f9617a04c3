use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, warn};

use super::models::{ChannelKeys, NotificationPayload, Subscription, SubscriptionKind};
use crate::kernel::traits::{
    BaseFcmService, BaseNotifier, BaseSubscriptionStore, BaseWebPushService, PushError,
};

/// Per-broadcast tally. `failed` counts deliveries that errored for any
/// reason, including subscriptions pruned during the pass.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FanoutReport {
    pub successful: usize,
    pub failed: usize,
}

/// Broadcasts one payload to every subscriber, pruning subscriptions
/// the provider has declared dead.
pub struct Notifier {
    subscriptions: Arc<dyn BaseSubscriptionStore>,
    web_push: Arc<dyn BaseWebPushService>,
    fcm: Arc<dyn BaseFcmService>,
}

impl Notifier {
    pub fn new(
        subscriptions: Arc<dyn BaseSubscriptionStore>,
        web_push: Arc<dyn BaseWebPushService>,
        fcm: Arc<dyn BaseFcmService>,
    ) -> Self {
        Self {
            subscriptions,
            web_push,
            fcm,
        }
    }

    /// Deliver to one subscriber. Returns whether delivery succeeded;
    /// never propagates an error, since one bad subscriber must not
    /// sink a broadcast.
    pub async fn send(&self, subscription: &Subscription, payload: &NotificationPayload) -> bool {
        let keys = match subscription.channel_keys() {
            Ok(keys) => keys,
            Err(e) => {
                error!(
                    "Subscription {} has unusable keys: {:?}",
                    subscription.id, e
                );
                return false;
            }
        };

        match self.dispatch(subscription, &keys, payload).await {
            Ok(()) => true,
            Err(e) => {
                self.handle_send_error(subscription, e).await;
                false
            }
        }
    }

    async fn dispatch(
        &self,
        subscription: &Subscription,
        keys: &ChannelKeys,
        payload: &NotificationPayload,
    ) -> Result<(), PushError> {
        match keys {
            ChannelKeys::Web { auth, p256dh } => {
                let body = serde_json::to_vec(payload)
                    .map_err(|e| PushError::Transport(e.to_string()))?;
                self.web_push
                    .deliver(&subscription.endpoint, p256dh, auth, &body)
                    .await
            }
            ChannelKeys::Fcm { token } => self.fcm.deliver(token, payload).await,
        }
    }

    /// Classify a failed delivery. Provider-confirmed dead
    /// subscriptions get pruned; anything else is kept for the next
    /// broadcast.
    async fn handle_send_error(&self, subscription: &Subscription, error: PushError) {
        let kind = subscription.channel_kind().ok();
        match (kind, &error) {
            (Some(SubscriptionKind::Web), PushError::EndpointGone) => {
                self.remove(subscription, "endpoint gone").await;
            }
            (Some(SubscriptionKind::Fcm), PushError::InvalidToken) => {
                self.remove(subscription, "token invalid").await;
            }
            (_, PushError::Provider(detail)) => {
                warn!(
                    "Provider rejected delivery to {}: {}",
                    subscription.endpoint, detail
                );
            }
            (_, PushError::Transport(detail)) => {
                warn!(
                    "Delivery to {} failed in transit: {}",
                    subscription.endpoint, detail
                );
            }
            _ => {
                error!(
                    "Unhandled notification send error for {}: {:?}",
                    subscription.endpoint, error
                );
            }
        }
    }

    async fn remove(&self, subscription: &Subscription, reason: &str) {
        match self.subscriptions.remove(subscription.id).await {
            Ok(()) => info!(
                "Pruned subscription {} ({}): {}",
                subscription.id, subscription.kind, reason
            ),
            Err(e) => error!(
                "Failed to prune subscription {}: {:?}",
                subscription.id, e
            ),
        }
    }

    /// Broadcast to every subscriber. Only a failure to list the
    /// subscribers is fatal.
    pub async fn send_to_all(&self, payload: &NotificationPayload) -> Result<FanoutReport> {
        let subscriptions = self.subscriptions.list().await?;
        let total = subscriptions.len();

        let sends = subscriptions
            .iter()
            .map(|sub| self.send(sub, payload));
        let outcomes = futures::future::join_all(sends).await;

        let successful = outcomes.iter().filter(|ok| **ok).count();
        let report = FanoutReport {
            successful,
            failed: total - successful,
        };
        info!(
            "Broadcast \"{}\": {} delivered, {} failed",
            payload.title, report.successful, report.failed
        );
        Ok(report)
    }
}

#[async_trait]
impl BaseNotifier for Notifier {
    async fn send_to_all(&self, payload: &NotificationPayload) -> Result<FanoutReport> {
        Notifier::send_to_all(self, payload).await
    }
}
