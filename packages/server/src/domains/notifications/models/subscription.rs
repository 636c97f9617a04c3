use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::common::SubscriptionId;

/// Which delivery channel a subscription belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionKind {
    Web,
    Fcm,
}

impl fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionKind::Web => write!(f, "web"),
            SubscriptionKind::Fcm => write!(f, "fcm"),
        }
    }
}

impl FromStr for SubscriptionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "web" => Ok(SubscriptionKind::Web),
            "fcm" => Ok(SubscriptionKind::Fcm),
            other => bail!("unknown subscription kind: {}", other),
        }
    }
}

/// The channel-specific credentials parsed out of the stored `keys`
/// JSON.
#[derive(Debug, Clone)]
pub enum ChannelKeys {
    Web { auth: String, p256dh: String },
    Fcm { token: String },
}

#[derive(Deserialize)]
struct WebKeys {
    auth: String,
    p256dh: String,
}

#[derive(Deserialize)]
struct FcmKeys {
    token: String,
}

/// One push subscriber. `endpoint` is the push service URL for web
/// subscriptions and the device token for FCM ones; `keys` holds the
/// channel credentials as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub endpoint: String,
    pub kind: String,
    pub keys: Value,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn channel_kind(&self) -> Result<SubscriptionKind> {
        self.kind.parse()
    }

    /// Parse the stored keys for this subscription's channel.
    pub fn channel_keys(&self) -> Result<ChannelKeys> {
        match self.channel_kind()? {
            SubscriptionKind::Web => {
                let keys: WebKeys = serde_json::from_value(self.keys.clone())
                    .context("web subscription is missing auth/p256dh keys")?;
                Ok(ChannelKeys::Web {
                    auth: keys.auth,
                    p256dh: keys.p256dh,
                })
            }
            SubscriptionKind::Fcm => {
                let keys: FcmKeys = serde_json::from_value(self.keys.clone())
                    .context("fcm subscription is missing its token")?;
                Ok(ChannelKeys::Fcm { token: keys.token })
            }
        }
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM subscriptions ORDER BY created_at")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_endpoint(
        endpoint: &str,
        kind: SubscriptionKind,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM subscriptions WHERE endpoint = $1 AND kind = $2")
            .bind(endpoint)
            .bind(kind.to_string())
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Register or refresh a subscriber, keyed by (endpoint, kind).
    /// Keys are validated against the channel before touching the
    /// database.
    pub async fn upsert(
        endpoint: &str,
        kind: SubscriptionKind,
        keys: Value,
        ip_address: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        match kind {
            SubscriptionKind::Web => {
                serde_json::from_value::<WebKeys>(keys.clone())
                    .context("web subscription is missing auth/p256dh keys")?;
            }
            SubscriptionKind::Fcm => {
                serde_json::from_value::<FcmKeys>(keys.clone())
                    .context("fcm subscription is missing its token")?;
            }
        }

        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO subscriptions (id, endpoint, kind, keys, ip_address)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (endpoint, kind) DO UPDATE SET
                keys = EXCLUDED.keys,
                ip_address = EXCLUDED.ip_address
            RETURNING *
            "#,
        )
        .bind(SubscriptionId::new())
        .bind(endpoint)
        .bind(kind.to_string())
        .bind(keys)
        .bind(ip_address)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete(id: SubscriptionId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subscription(kind: &str, keys: Value) -> Subscription {
        Subscription {
            id: SubscriptionId::new(),
            endpoint: "https://push.example.org/send/abc".to_string(),
            kind: kind.to_string(),
            keys,
            ip_address: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn parses_web_keys() {
        let sub = subscription("web", json!({"auth": "a1", "p256dh": "p1"}));
        match sub.channel_keys().unwrap() {
            ChannelKeys::Web { auth, p256dh } => {
                assert_eq!(auth, "a1");
                assert_eq!(p256dh, "p1");
            }
            other => panic!("expected web keys, got {:?}", other),
        }
    }

    #[test]
    fn parses_fcm_keys() {
        let sub = subscription("fcm", json!({"token": "device-token"}));
        match sub.channel_keys().unwrap() {
            ChannelKeys::Fcm { token } => assert_eq!(token, "device-token"),
            other => panic!("expected fcm keys, got {:?}", other),
        }
    }

    #[test]
    fn rejects_keys_that_do_not_match_the_kind() {
        let sub = subscription("web", json!({"token": "device-token"}));
        assert!(sub.channel_keys().is_err());

        let sub = subscription("banana", json!({}));
        assert!(sub.channel_kind().is_err());
    }
}
